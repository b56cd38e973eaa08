//! Emoji selection for a short forecast.
//!
//! The icon name doubles as the window-icon file stem, so the presentation
//! layer can load `{name}_{theme}.png` for whichever entry wins.

struct EmojiSpec {
    name: &'static str,
    glyph: &'static str,
    keywords: &'static [&'static str],
}

const NIGHT: EmojiSpec = EmojiSpec {
    name: "night",
    glyph: "\u{1F319}",
    keywords: &[],
};

// Table order is the tie-break: with no keyword hits the first entry wins.
const EMOJIS: &[EmojiSpec] = &[
    EmojiSpec {
        name: "sunny",
        glyph: "\u{2600}\u{FE0F}",
        keywords: &["sunny", "clear", "hot"],
    },
    EmojiSpec {
        name: "mostlySunny",
        glyph: "\u{1F324}\u{FE0F}",
        keywords: &["mostly sunny", "mostly clear"],
    },
    EmojiSpec {
        name: "partlySunny",
        glyph: "\u{26C5}",
        keywords: &["partly sunny", "partly cloudy"],
    },
    EmojiSpec {
        name: "cloudy",
        glyph: "\u{2601}\u{FE0F}",
        keywords: &["cloudy", "overcast"],
    },
    EmojiSpec {
        name: "fog",
        glyph: "\u{1F32B}\u{FE0F}",
        keywords: &["fog", "haze", "mist", "smoke"],
    },
    EmojiSpec {
        name: "rain",
        glyph: "\u{1F327}\u{FE0F}",
        keywords: &["rain", "showers", "drizzle"],
    },
    EmojiSpec {
        name: "thunderstorm",
        glyph: "\u{26C8}\u{FE0F}",
        keywords: &["thunderstorm", "thunderstorms", "lightning"],
    },
    EmojiSpec {
        name: "snow",
        glyph: "\u{1F328}\u{FE0F}",
        keywords: &["snow", "sleet", "flurries", "blizzard", "ice"],
    },
    EmojiSpec {
        name: "windy",
        glyph: "\u{1F32C}\u{FE0F}",
        keywords: &["windy", "breezy", "blustery"],
    },
];

/// Pick the (name, glyph) pair for a short forecast. Nighttime always gets
/// the night glyph; otherwise the entry with the most keyword hits wins,
/// earliest entry on a tie.
pub fn emoji_for(short_forecast: &str, is_daytime: bool) -> (&'static str, &'static str) {
    if !is_daytime {
        return (NIGHT.name, NIGHT.glyph);
    }

    let forecast = short_forecast.to_lowercase();
    let mut best = &EMOJIS[0];
    let mut best_score = score(&EMOJIS[0], &forecast);
    for spec in &EMOJIS[1..] {
        let s = score(spec, &forecast);
        if s > best_score {
            best = spec;
            best_score = s;
        }
    }
    (best.name, best.glyph)
}

fn score(spec: &EmojiSpec, forecast: &str) -> usize {
    spec.keywords
        .iter()
        .filter(|keyword| forecast.contains(*keyword))
        .count()
}
