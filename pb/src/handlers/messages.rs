//! User-facing bot replies

pub const START: &str = "🍌 Pro Banana AI Bot

Assalomu alaykum! Menga xabar yoki rasm yuboring.

Buyruqlar:
/start - Botni ishga tushirish
/help - Yordam
/preview - Marketplace preview (wizard)
/cover - 1 ta cover (wizard)
/cancel - Preview wizardni bekor qilish
/image <tavsif> - Rasm yaratish
/clear - Suhbat tarixini tozalash";

pub const HELP: &str = "🍌 Yordam

Matn yuboring — javob beraman.
Rasm yuboring — tahlil/tahrir qilaman.
/preview — marketplace uchun pro preview.
/cover — marketplace cover (1 ta rasm).
/cancel — preview wizardni bekor qilish.
/image <tavsif> — rasm yaratish.
/clear — suhbat tarixini tozalash.";

pub const CANCELLED: &str = "✅ Bekor qilindi.";
pub const HISTORY_CLEARED: &str = "✅ Suhbat tarixi tozalandi!";
pub const UNKNOWN_COMMAND: &str = "❌ Noma'lum buyruq. /help ni ishlating.";

pub const IMAGE_PROMPT_MISSING: &str = "❌ Iltimos, rasm tavsifini kiriting!\nMisol: /image banana in space";
pub const IMAGE_IN_PROGRESS: &str = "🎨 Rasm yaratilmoqda, biroz kuting...";
pub const IMAGE_FAILED: &str = "❌ Rasm yaratishda xatolik yuz berdi. Qayta urinib ko'ring.";

pub const CHAT_FAILED: &str = "❌ Xatolik yuz berdi. Iltimos, qayta urinib ko'ring.";
pub const DOWNLOAD_FAILED: &str = "❌ Rasmni yuklashda xatolik yuz berdi.";
pub const EDIT_NOT_RETURNED: &str =
    "❌ Rasmni tahrir qilib qaytara olmadim. Iltimos, rasm(lar)ni qayta yuboring yoki tavsifni qisqartiring.";

pub const DEFAULT_PHOTO_CAPTION: &str = "Bu rasmni tahlil qiling";
pub const DEFAULT_GROUP_CAPTION: &str = "Bu rasmlarni tahlil qiling";

pub const NOTE_SAVED: &str = "✅ Note saqlandi.";
pub const NOTE_REQUEST_ANSWER: &str = "Note yuboring (bekor qilish: /cancel).";
pub const NOTE_REQUEST: &str = "📝 Qo'shimcha note yuboring (bekor qilish: /cancel).";
pub const PHOTO_NOT_FOUND: &str = "❌ Rasm topilmadi.";
pub const PHOTO_REQUEST: &str = "📷 Mahsulot rasmini yuboring.";
pub const NOT_YOUR_MENU: &str = "Bu menyu siz uchun emas.";
pub const PROMPT_SENDING: &str = "Prompt yuborilyapti…";
pub const GENERATING: &str = "Generating…";
pub const CALLBACK_OK: &str = "OK";

pub const PREVIEW_FAILED: &str = "❌ Preview yaratishda xatolik yuz berdi. Qayta urinib ko'ring.";
pub const PREVIEW_NO_IMAGES: &str =
    "❌ Preview rasm(lar)i chiqarmadi. Boshqa rasm yuboring yoki tavsifni qisqartiring.";

pub fn image_ready(prompt: &str) -> String {
    format!("✅ Tayyor! Rasm: {:?}", prompt)
}

pub fn preview_in_progress(count: usize) -> String {
    format!("🎨 {} ta preview tayyorlanmoqda, biroz kuting...", count)
}

/// Caption for the first generated preview image
pub fn preview_ready(images: usize, style: Option<&str>, category: Option<&str>) -> String {
    let mut caption = format!("✅ Tayyor! preview ({} ta)", images);
    if let Some(style) = style.filter(|s| !s.is_empty()) {
        caption.push_str(", style=");
        caption.push_str(style);
    }
    if let Some(category) = category.filter(|c| !c.is_empty()) {
        caption.push_str(", cat=");
        caption.push_str(category);
    }
    caption
}
