//! Keyword routing of recognized text.
//!
//! Matching is substring based and case-insensitive; recognized text arrives
//! without reliable punctuation or casing.

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// "What colour is the light?"
    LightQuery,
    /// "What's ahead?"
    AheadQuery,
    WhereAmI,
    Navigate { destination: String },
    NextStep,
    StopNavigation,
    /// 0 today, 1 tomorrow, 2 the day after
    Weather { day_offset: u8 },
    /// Anything else goes to the assistant
    Chat(String),
}

const NAVIGATE: &[&str] = &["navigate to ", "take me to ", "directions to ", "导航到", "导航去", "带我去"];
const NEXT_STEP: &[&str] = &["next step", "what next", "下一步"];
const STOP: &[&str] = &["stop navigation", "cancel navigation", "结束导航", "停止导航"];
const LIGHT: &[&str] = &["traffic light", "the light", "红绿灯", "信号灯"];
const AHEAD: &[&str] = &["ahead", "in front", "前面", "前方"];
const WHERE: &[&str] = &["where am i", "my location", "我在哪", "当前位置"];
const WEATHER: &[&str] = &["weather", "forecast", "天气"];
const DAY_AFTER: &[&str] = &["day after tomorrow", "后天"];
const TOMORROW: &[&str] = &["tomorrow", "明天"];

pub fn parse(text: &str) -> Intent {
    let lowered = text.trim().to_lowercase();

    if let Some(destination) = after_any(&lowered, text.trim(), NAVIGATE) {
        if !destination.is_empty() {
            return Intent::Navigate { destination };
        }
    }
    if contains_any(&lowered, STOP) {
        return Intent::StopNavigation;
    }
    if contains_any(&lowered, NEXT_STEP) {
        return Intent::NextStep;
    }
    if contains_any(&lowered, WEATHER) {
        // "day after tomorrow" contains "tomorrow"
        let day_offset = if contains_any(&lowered, DAY_AFTER) {
            2
        } else if contains_any(&lowered, TOMORROW) {
            1
        } else {
            0
        };
        return Intent::Weather { day_offset };
    }
    if contains_any(&lowered, LIGHT) {
        return Intent::LightQuery;
    }
    if contains_any(&lowered, WHERE) {
        return Intent::WhereAmI;
    }
    if contains_any(&lowered, AHEAD) {
        return Intent::AheadQuery;
    }
    Intent::Chat(text.trim().to_string())
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Text following the first matching keyword, taken from the original casing.
fn after_any(lowered: &str, original: &str, needles: &[&str]) -> Option<String> {
    needles.iter().find_map(|needle| {
        let start = lowered.find(needle)? + needle.len();
        // Lowercasing can change byte lengths outside ASCII
        let rest = if lowered.len() == original.len() {
            original.get(start..)?
        } else {
            lowered.get(start..)?
        };
        Some(
            rest.trim()
                .trim_end_matches(|c: char| c.is_ascii_punctuation() || c == '。' || c == '？')
                .trim()
                .to_string(),
        )
    })
}
