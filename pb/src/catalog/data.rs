//! Built-in catalog tables

use super::{Catalog, Category, FrameTemplate, Style};

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn frame(id: &str, title: &str, concept: &str, execution: &[&str]) -> FrameTemplate {
    FrameTemplate {
        id: id.to_string(),
        title: title.to_string(),
        concept: concept.to_string(),
        execution: lines(execution),
    }
}

fn category(key: &str, name: &str, global: &[&str], interaction: &[&str], abstraction: &[&str]) -> Category {
    Category {
        key: key.to_string(),
        name: name.to_string(),
        global: lines(global),
        interaction: lines(interaction),
        abstraction: lines(abstraction),
    }
}

fn style(key: &str, name: &str, add: &[&str], notes: &[&str]) -> Style {
    Style {
        key: key.to_string(),
        name: name.to_string(),
        add: lines(add),
        notes: lines(notes),
    }
}

/// Assemble the built-in catalog
pub(super) fn builtin() -> Catalog {
    Catalog::new(categories(), styles(), frames())
}

fn frames() -> Vec<FrameTemplate> {
    vec![
        frame(
            "hero_still_life",
            "Iconic Hero Still Life",
            "Bold, confident product presentation with dramatic composition",
            &[
                "Center-framed product on seamless background",
                "Strong directional key light from 45° angle",
                "Deep shadows for depth and dimension",
                "Negative space emphasizing product authority",
                "Ultra-sharp focus, every detail visible",
                "Color grading: rich, saturated, premium feel",
            ],
        ),
        frame(
            "extreme_macro",
            "Extreme Macro Detail",
            "Surface texture and material craftsmanship",
            &[
                "Hyper-close-up on product surface/texture (and authentic label/markings if present)",
                "Shallow depth of field, bokeh background",
                "Reveal material quality: glass reflection, paper fiber, metal grain",
                "Macro lens precision",
                "Highlight authentic typography/markings if present, otherwise focus on unique material details",
                "Clinical sharpness in focused area",
            ],
        ),
        frame(
            "dynamic_interaction",
            "Dynamic Particle Interaction",
            "Product surrounded by motion and energy",
            &[
                "Particle cloud, powder burst, light streaks, or category-appropriate micro-effects around product (environment only)",
                "Product remains perfectly still and centered",
                "Frozen motion capture (high-speed photography aesthetic)",
                "Effects complement product color palette",
                "Controlled chaos: dynamic yet clean",
                "Avoid liquids unless the product category clearly implies it",
                "Product untouched, pristine",
            ],
        ),
        frame(
            "minimal_sculptural",
            "Minimal Sculptural Arrangement",
            "Abstract forms meeting product design",
            &[
                "Product placed among geometric shapes (spheres, cubes, cylinders)",
                "Monochromatic or tonal color scheme",
                "Architectural precision in object placement",
                "Clean lines, perfect symmetry or intentional asymmetry",
                "Matte and glossy surface interplay",
                "Museum-quality lighting",
            ],
        ),
        frame(
            "floating_elements",
            "Floating Elements Composition",
            "Weightlessness, innovation, future-forward",
            &[
                "Product appears to levitate",
                "Supporting elements suspended mid-air (ribbons/fabrics/petals/components as abstract cues)",
                "Invisible support wires aesthetic",
                "Airy, light-filled environment",
                "Soft shadows suggesting gentle elevation",
                "Ethereal yet grounded in realism",
            ],
        ),
        frame(
            "sensory_closeup",
            "Sensory Close-Up",
            "Tactile invitation, almost touchable realism",
            &[
                "Tight crop emphasizing product shape and form",
                "Lighting that reveals three-dimensionality",
                "Focus on how light plays across the surface",
                "Viewer feels texture through the image",
                "Intimate perspective",
                "Warm, inviting atmosphere",
            ],
        ),
        frame(
            "precision_feature_study",
            "Precision Detail Feature Study",
            "Premium micro-details and feature craftsmanship (not just texture)",
            &[
                "Medium-macro close-up that still shows the product’s form (not an abstract texture-only crop).",
                "Focus on a signature feature: edge bevel, cap mechanism, nozzle, embossing, seam/stitch, button/knurl, hinge, or material junction.",
                "Raking side light to reveal precision; controlled specular highlights.",
                "Focus-stacking look (sharp across the key feature) while background falls to soft bokeh.",
                "Show fit-and-finish; zero dust, zero fingerprints.",
                "Keep branding accurate and legible where visible; never crop in a way that changes perceived logo/typography.",
            ],
        ),
        frame(
            "ingredient_abstraction",
            "Ingredient/Component Abstraction",
            "Symbolic representation, not literal",
            &[
                "Build a symbolic, non-literal abstraction of the product’s essence (component/ingredient vibe, not a literal pile).",
                "Use refined material metaphors: textures, silhouettes, micro-forms, geometric cues.",
                "Keep the product as the hero; abstraction supports it without competing.",
                "Commercial clarity: premium, clean, immediately readable as high-end advertising.",
                "No gimmicks, no clutter, no readable text; avoid kitschy literal props.",
                "Maintain consistent studio-grade lighting and pristine product integrity.",
            ],
        ),
        frame(
            "surreal_fusion",
            "Surreal Elegant Fusion",
            "Reality meets imagination, unexpected yet harmonious",
            &[
                "Product in impossible but beautiful scenario",
                "Floating in cloud-like softness, or reflective infinity space",
                "Dreamlike distortion in environment only (never distort product)",
                "Product remains photographically accurate",
                "Surrealism in setting, realism in product",
                "High fashion editorial meets fine art",
            ],
        ),
    ]
}

/// The neutral category used when none is chosen or the key is unknown
pub(super) fn auto_category() -> Category {
    category(
        "",
        "Auto/General",
        &[
            "Choose category-appropriate interactions that never alter the product.",
            "Avoid literal ingredients unless clearly implied by the product itself.",
        ],
        &[
            "Use particles, clean light streaks, or gentle atmospheric haze as an abstract energy accent (environment only).",
            "Keep effects behind/beside the product; never cover key details or any real branding.",
        ],
        &[
            "Use symbolic material cues that suggest components/essence (non-literal).",
            "Keep it refined, minimal, and commercially clear.",
        ],
    )
}

fn categories() -> Vec<Category> {
    vec![
        auto_category(),
        category(
            "electronics",
            "Electronics / Tech",
            &[
                "Tech cues must come from lighting, precision surfaces, and abstract geometry—not busy UI graphics.",
                "No readable UI or circuitry text.",
            ],
            &[
                "Use controlled micro-particles, ionized mist, or clean light streaks (environment only).",
                "Avoid messy liquid; prefer precision energy effects.",
            ],
            &[
                "Abstract components: prismatic glass, anodized metal fragments, micro-lens bokeh, clean electromagnetic lines (non-text).",
                "Symbolize performance/precision without literal parts.",
            ],
        ),
        category(
            "beauty",
            "Beauty / Cosmetic",
            &[
                "Sensory softness and tactile finish are key; keep it premium and clean.",
                "No rendered claims as text.",
            ],
            &[
                "Use silk-like powder bloom, fine mist, pearlescent micro-particles, or viscous glossy gel arcs.",
                "Controlled chaos; keep packaging pristine.",
            ],
            &[
                "Abstract essence: mineral textures, botanical silhouettes, creamy swirls, translucent petals (symbolic, not literal).",
                "Commercial clarity with refined artistry.",
            ],
        ),
        category(
            "beverage",
            "Beverage",
            &[
                "Emphasize coldness, freshness, and clarity; keep label readable.",
                "Condensation/ice cues must look physically correct.",
            ],
            &[
                "Use sculptural liquid splash arcs, micro-droplets, and ice crystals framing the product.",
                "High-speed frozen motion aesthetic; no label occlusion.",
            ],
            &[
                "Abstract components: ice formations, botanical silhouettes, carbonation bubbles, liquid droplets (symbolic).",
                "No literal fruit piles unless the product explicitly implies it.",
            ],
        ),
        category(
            "food",
            "Food / Gourmet",
            &[
                "Keep it appetizing but still luxury editorial; avoid messy crumbs unless controlled.",
                "No readable menu text or overlays.",
            ],
            &[
                "Use fine spice/powder burst, steam-like haze, or crisp particle motion (controlled).",
                "If liquid is used, keep it minimal and sculptural.",
            ],
            &[
                "Abstract essence: refined textures (salt crystals, cocoa dust, grain patterns) in geometric composition, not literal piles.",
                "Symbolic, minimal, premium.",
            ],
        ),
        category(
            "home_living",
            "Home & Living",
            &[
                "Emphasize material honesty (wood/ceramic/textile cues) and calm premium atmosphere.",
                "Keep environment uncluttered and gallery-like.",
            ],
            &[
                "Use gentle dust motes, clean fabric ribbon motion, or soft particles—subtle, not energetic.",
                "Maintain serene, controlled composition.",
            ],
            &[
                "Abstract components: textile weaves, ceramic glaze textures, soft natural shapes (non-literal).",
                "Suggest comfort and quality through material cues.",
            ],
        ),
        category(
            "fashion",
            "Fashion / Accessories",
            &[
                "Editorial fashion sensibility; shape, silhouette, and light are the hero.",
                "Avoid any readable magazine text or extra logos.",
            ],
            &[
                "Use flowing fabric-like motion, light ribbons, or minimal particles that feel runway/editorial.",
                "Keep it elegant and restrained.",
            ],
            &[
                "Abstract components: leather grain, metal hardware reflections, textile fibers, gemstone-like bokeh (symbolic).",
                "Non-obvious, high-fashion refinement.",
            ],
        ),
        category(
            "luxury_object",
            "Luxury Object",
            &[
                "Museum-grade restraint: precious materials, pristine reflections, controlled sparkle.",
                "No gaudy glints; highlight craft and rarity.",
            ],
            &[
                "Use subtle luminous dust, refined micro-sparkle, or elegant haze—not chaotic splashes.",
                "Keep it premium and quiet.",
            ],
            &[
                "Abstract essence: gemstone refractions, brushed metal micro-texture, incense-like wisps (symbolic).",
                "Fine-art energy with commercial clarity.",
            ],
        ),
    ]
}

fn styles() -> Vec<Style> {
    vec![
        style(
            "luxury_editorial",
            "Luxury Editorial (Gala Awards)",
            &[
                "ultra-premium luxury editorial advertising",
                "award gala atmosphere (high-end ceremony vibe)",
                "black & gold stage palette (environment only)",
                "cinematic spotlight beams, controlled volumetric haze",
                "gold confetti micro-particles / stardust dust (subtle, premium)",
                "luxury bokeh light wall (background only)",
                "museum-grade product realism: pristine, perfect reflections",
            ],
            &["Gala mood: elegant ceremony lighting + subtle gold dust, NOT party chaos."],
        ),
        style(
            "minimal_museum",
            "Miniature Museum (Diorama)",
            &[
                "miniature museum diorama set (scale model exhibition space)",
                "macro photography of a miniature diorama (tiny set details visible)",
                "tilt-shift miniature look (subtle), shallow depth of field with controlled focus plane",
                "museum-grade minimalism (few elements)",
                "product remains photorealistic, pristine, and undistorted",
                "no readable text anywhere in the scene",
            ],
            &["Miniature rule: the environment is a scale model museum diorama."],
        ),
        style(
            "futuristic_tech",
            "Futuristic Tech",
            &[
                "futuristic premium tech advertising",
                "sterile clean studio",
                "precision lighting",
                "high-contrast micro-detail",
            ],
            &["No cyber clutter; premium minimal."],
        ),
        style(
            "organic_sensory",
            "Organic Sensory (Tactile Luxury)",
            &[
                "organic sensory luxury advertising",
                "soft window daylight in studio (diffused natural light)",
                "natural materials as set design only: linen fabric, matte ceramic, warm wood grain, soft stone",
                "calm premium mood, spa/boutique sensibility",
            ],
            &["Keep it minimal and premium; product identity must never change."],
        ),
        style(
            "dark_premium",
            "Dark Premium",
            &[
                "dark premium advertising",
                "low-key studio lighting",
                "controlled rim light",
                "deep gradients",
            ],
            &["Label must remain readable on dark."],
        ),
        style(
            "high_key_clean",
            "High-Key Clean",
            &[
                "high-key bright studio",
                "clean white/ivory backgrounds",
                "soft shadow under product",
                "clinical clarity",
            ],
            &["Avoid blown highlights; keep micro-detail."],
        ),
        style(
            "monochrome_graphic",
            "Japanese B&W Cinema (Premium)",
            &[
                "true black-and-white cinematography (no color)",
                "high-contrast lighting, deep blacks, rich midtones",
                "subtle 35mm film grain (fine, premium)",
            ],
            &["FULL BLACK-AND-WHITE LOOK: the entire image should be monochrome."],
        ),
        style(
            "brutalist_lux",
            "Brutalist Luxury",
            &[
                "brutalist luxury set design",
                "raw stone/concrete vibe (background only)",
                "hard geometry with soft light",
            ],
            &["Abstract props; keep it clean."],
        ),
        style(
            "neo_pop_premium",
            "Neo-Pop (Pop Star / Stage)",
            &[
                "pop star stage vibe (premium pop aesthetic)",
                "bold pop color blocking (background/set only)",
                "neon accent lighting, clean rim lights (controlled, not chaotic)",
                "graphic shapes: circles, stripes, geometric cutouts (set design only)",
                "glossy acrylic / chrome props (background only), modern pop set",
                "high-saturation accents with strict restraint (2–3 accent colors max)",
                "clean gradients, crisp edges, studio-grade polish",
                "sparkle micro-particles / confetti hints (very subtle, premium)",
                "product remains photorealistic, pristine, tack-sharp",
            ],
            &["Accent colors apply to environment only; NEVER recolor the product."],
        ),
        style(
            "cinematic_film",
            "Cinematic Film",
            &[
                "cinematic filmic lighting",
                "subtle film grain",
                "controlled halation",
            ],
            &["Filmic but still billboard-clean."],
        ),
        style(
            "glass_light",
            "Glass & Light (Clean Tech Ad)",
            &[
                "glass-first environment: transparent glass, crystal, acrylic, and prism slabs (background only)",
                "clean caustics patterns on the floor/walls (subtle, realistic)",
                "prismatic light rays, controlled rainbow dispersion (very refined)",
                "NO refraction passing through the product silhouette",
                "product must remain perfectly undistorted and photorealistic",
            ],
            &["Refraction/glass effects must frame the product, never warp label/typography."],
        ),
        style(
            "liquid_sculpture",
            "Liquid Sculpture (Wrap / Orbit)",
            &[
                "sculptural liquid ribbons wrapping around the product (360-degree orbit)",
                "liquid arcs / rings framing the product from all sides",
                "never crossing the label/branding",
                "high-speed splash aesthetic with frozen motion (studio-grade)",
            ],
            &["Never cover label/branding; keep product readable and undistorted."],
        ),
        style(
            "macro_lab",
            "Macro Lab (Detail-Only)",
            &[
                "precision macro lab vibe",
                "detail-only macro photography: show only product micro-details, not a full product hero shot",
                "extreme macro framing of label print, embossing, seam, edge bevel, cap mechanism, nozzle, texture, material junction",
                "background must be mid-gray to dark-gray neutral gradient (graphite/charcoal), NOT white",
                "clinical clarity, zero dust, zero fingerprints",
            ],
            &["Detail-only rule: tight macro close-ups; avoid wide shots."],
        ),
        style(
            "gulliver_mini_workers",
            "Gulliver Miniature Workers (Diorama)",
            &[
                "gulliver-scale diorama: the product is a giant monument, tiny workers interact with it",
                "miniature people (tiny engineers/riggers/technicians) working around the product",
                "tiny ropes, pulleys, scaffolding, ladders, miniature cranes (props only)",
                "micro-scale construction/maintenance scene: polishing, measuring, inspecting, securing",
                "macro photography of a miniature diorama, realistic scale cues",
                "tilt-shift miniature look (subtle), shallow DOF with controlled focus plane",
                "premium high-end advertising finish (clean, intentional, not messy)",
                "product remains 100% photorealistic and undistorted",
                "do not cover label/branding; keep it readable where visible",
                "no readable text anywhere in the scene",
            ],
            &[
                "Gulliver rule: tiny workers + giant product, but still premium and clean.",
                "Workers/props must never block or damage branding/label.",
            ],
        ),
        style(
            "fashion_editorial",
            "Fashion Editorial",
            &[
                "fashion editorial lighting",
                "lookbook polish",
                "soft contrast",
            ],
            &["Editorial taste; minimal but expressive."],
        ),
        style(
            "sports_energy_clean",
            "Sports Energy Clean (High-Speed Action Cam)",
            &[
                "high-speed sports commercial photography",
                "fast-shutter action capture (crisp freeze + controlled motion accents)",
                "clean motion streaks made of light (environment only, premium)",
                "product remains photorealistic, pristine, and undistorted",
            ],
            &["Energy effects are controlled and clean (no chaotic dust clouds)."],
        ),
        style(
            "fantasy_surreal",
            "Fantasy (Surreal)",
            &[
                "fantasy surreal high-end advertising",
                "floating architecture / impossible geometry (background only)",
                "premium VFX particles: iridescent dust, aurora-like ribbons (environment only)",
                "surreal but elegant, never kitschy",
            ],
            &[
                "Surrealism is allowed ONLY in the environment; the product must remain perfectly realistic and undistorted.",
            ],
        ),
        style(
            "gold",
            "Opulent Gold (Indulgent Luxury)",
            &[
                "Use the attached reference photo as the exact product identity lock.",
                "Interpret and replicate the product from the reference precisely: shape, proportions, silhouette, materials, finishes, colors, logos/decals, knobs/switches, hardware placement.",
                "Do not redesign, do not change the model, and do not introduce extra parts.",
                "indulgent luxury product photography, opulent richness, wealth aesthetic",
                "bathed in warm golden light (honey-toned highlights)",
                "warm highlights and deep shadows, cinematic contrast",
                "premium studio lighting, controlled reflections, high-end commercial luxury advertising look",
                "surrounded by gold leaf flakes and fine gold dust micro-particles (subtle, premium, not chaotic)",
                "honey-toned reflective surfaces / glossy dark surfaces as environment only",
                "hero product centered, clean separation from background, crisp edges",
                "shallow depth of field, ultra-detailed photoreal, tack-sharp product focus",
                "background stays elegant and minimal; gold elements frame the product without clutter",
                "no text, no watermark, no border, no frame, no bars",
                "full-bleed image: no empty edges; do not add padding or letterboxing",
                "gold effects must NOT cover label/branding; keep typography readable where visible",
                "never recolor or alter the product; gold tone applies to lighting/environment only",
            ],
            &[
                "Gold style = lighting + environment + micro-particles. Product identity stays 100% locked to reference.",
                "Keep it 'rich and controlled' (no cheap glitter, no party confetti).",
            ],
        ),
    ]
}
