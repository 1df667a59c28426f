//! Static game catalog
//!
//! Per-language metadata for the five screening games, indexed by game
//! number. The catalog is immutable and safe for unsynchronized
//! concurrent reads; any language without an entry falls back to
//! [`DEFAULT_LANGUAGE`] at both the metadata and passage level.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of games in a full screening
pub const TOTAL_GAMES: u8 = 5;

/// Fallback language for catalog lookups
pub const DEFAULT_LANGUAGE: &str = "en";

/// The five fixed screening game types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// Game 1: reading with webcam gaze tracking
    EyeTrackingReading,
    /// Game 2: read-aloud speech recording
    SpeechFluency,
    /// Game 3: letter/word copying with stroke capture
    Handwriting,
    /// Game 4: visual pattern matching
    PatternRecognition,
    /// Game 5: timed reaction task
    ResponseTime,
}

impl GameType {
    /// Game type for a game number, `None` outside 1..=5
    pub fn for_game(game_number: u8) -> Option<Self> {
        match game_number {
            1 => Some(Self::EyeTrackingReading),
            2 => Some(Self::SpeechFluency),
            3 => Some(Self::Handwriting),
            4 => Some(Self::PatternRecognition),
            5 => Some(Self::ResponseTime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EyeTrackingReading => "eye_tracking_reading",
            Self::SpeechFluency => "speech_fluency",
            Self::Handwriting => "handwriting",
            Self::PatternRecognition => "pattern_recognition",
            Self::ResponseTime => "response_time",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "eye_tracking_reading" => Some(Self::EyeTrackingReading),
            "speech_fluency" => Some(Self::SpeechFluency),
            "handwriting" => Some(Self::Handwriting),
            "pattern_recognition" => Some(Self::PatternRecognition),
            "response_time" => Some(Self::ResponseTime),
            _ => None,
        }
    }
}

/// Static per-game metadata
struct GameMeta {
    title: &'static str,
    instructions: &'static str,
    duration_seconds: u32,
}

/// Game 1 content: the passage the student reads while tracked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub passage: String,
}

/// Catalog entry returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    pub game_number: u8,
    pub game_type: GameType,
    pub title: String,
    pub instructions: String,
    pub duration_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<GameContent>,
}

static GAME_METADATA: Lazy<HashMap<&'static str, HashMap<u8, GameMeta>>> = Lazy::new(|| {
    let mut languages = HashMap::new();

    let mut en = HashMap::new();
    en.insert(1, GameMeta {
        title: "Reading Task",
        instructions: "Ensure your face is well-lit and camera is enabled. Follow the red dot to calibrate, then read the text naturally.",
        duration_seconds: 60,
    });
    en.insert(2, GameMeta {
        title: "Speech Fluency",
        instructions: "Read the sentences shown on screen clearly and at your normal pace.",
        duration_seconds: 30,
    });
    en.insert(3, GameMeta {
        title: "Handwriting Task",
        instructions: "Copy the letters and words shown on screen using the drawing area.",
        duration_seconds: 60,
    });
    en.insert(4, GameMeta {
        title: "Pattern Recognition",
        instructions: "Look at each pattern and select the correct answer.",
        duration_seconds: 120,
    });
    en.insert(5, GameMeta {
        title: "Quick Response",
        instructions: "Click the button as fast as you can when you see the colored circle.",
        duration_seconds: 60,
    });
    languages.insert("en", en);

    let mut hi = HashMap::new();
    hi.insert(1, GameMeta {
        title: "पढ़ने का कार्य",
        instructions: "सुनिश्चित करें कि आपका चेहरा अच्छी तरह से प्रकाशित है और कैमरा सक्षम है। कैलिब्रेट करने के लिए लाल बिंदु का पालन करें, फिर पाठ को स्वाभाविक रूप से पढ़ें।",
        duration_seconds: 60,
    });
    hi.insert(2, GameMeta {
        title: "भाषण प्रवाह",
        instructions: "स्क्रीन पर दिखाए गए वाक्यों को स्पष्ट रूप से और अपनी सामान्य गति से पढ़ें।",
        duration_seconds: 30,
    });
    hi.insert(3, GameMeta {
        title: "हस्तलेखन कार्य",
        instructions: "ड्राइंग एरिया का उपयोग करके स्क्रीन पर दिखाए गए अक्षरों और शब्दों को कॉपी करें।",
        duration_seconds: 60,
    });
    hi.insert(4, GameMeta {
        title: "पैटर्न पहचान",
        instructions: "प्रत्येक पैटर्न को देखें और सही उत्तर चुनें।",
        duration_seconds: 120,
    });
    hi.insert(5, GameMeta {
        title: "त्वरित प्रतिक्रिया",
        instructions: "जब आप रंगीन वृत्त देखें तो जितनी जल्दी हो सके बटन पर क्लिक करें।",
        duration_seconds: 60,
    });
    languages.insert("hi", hi);

    languages
});

static READING_PASSAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut passages = HashMap::new();
    passages.insert(
        "en",
        "The quick brown fox jumps over the lazy dog. This sentence contains every letter of the alphabet. \
Reading is a wonderful skill that opens doors to new worlds. Every day, we learn something new through reading. \
Children who read regularly develop better vocabulary and comprehension skills. Books are treasures of knowledge.",
    );
    passages.insert(
        "hi",
        "एक तेज भूरी लोमड़ी आलसी कुत्ते के ऊपर कूदती है। पढ़ना एक अद्भुत कौशल है जो नई दुनिया के दरवाजे खोलता है। \
हर दिन, हम पढ़ने के माध्यम से कुछ नया सीखते हैं। जो बच्चे नियमित रूप से पढ़ते हैं उनमें बेहतर शब्दावली और समझ कौशल विकसित होता है।",
    );
    passages
});

/// Reading passage for game 1, with language fallback
pub fn reading_passage(language: &str) -> &'static str {
    READING_PASSAGES
        .get(language)
        .or_else(|| READING_PASSAGES.get(DEFAULT_LANGUAGE))
        .copied()
        .unwrap_or_default()
}

/// Catalog entry for a game in the requested language
///
/// Falls back to [`DEFAULT_LANGUAGE`] when the language has no entry.
/// Returns `None` for game numbers outside 1..=5; callers reject those
/// before lookup.
pub fn game_info(language: &str, game_number: u8) -> Option<GameInfo> {
    let game_type = GameType::for_game(game_number)?;

    let per_language = GAME_METADATA
        .get(language)
        .or_else(|| GAME_METADATA.get(DEFAULT_LANGUAGE))?;
    let meta = per_language.get(&game_number)?;

    let content = (game_number == 1).then(|| GameContent {
        passage: reading_passage(language).to_string(),
    });

    Some(GameInfo {
        game_number,
        game_type,
        title: meta.title.to_string(),
        instructions: meta.instructions.to_string(),
        duration_seconds: meta.duration_seconds,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_games_present_per_language() {
        for language in ["en", "hi"] {
            for game_number in 1..=TOTAL_GAMES {
                let info = game_info(language, game_number).unwrap();
                assert_eq!(info.game_number, game_number);
                assert!(!info.title.is_empty());
                assert!(!info.instructions.is_empty());
                assert!(info.duration_seconds > 0);
            }
        }
    }

    #[test]
    fn test_game_one_carries_passage() {
        let info = game_info("en", 1).unwrap();
        let content = info.content.unwrap();
        assert!(content.passage.contains("quick brown fox"));

        // Other games carry no content
        for game_number in 2..=TOTAL_GAMES {
            assert!(game_info("en", game_number).unwrap().content.is_none());
        }
    }

    #[test]
    fn test_unknown_language_falls_back_to_default() {
        let fallback = game_info("sw", 3).unwrap();
        let default = game_info(DEFAULT_LANGUAGE, 3).unwrap();
        assert_eq!(fallback.title, default.title);
        assert_eq!(fallback.instructions, default.instructions);

        assert_eq!(reading_passage("sw"), reading_passage(DEFAULT_LANGUAGE));
    }

    #[test]
    fn test_game_number_out_of_range() {
        assert!(game_info("en", 0).is_none());
        assert!(game_info("en", 6).is_none());
        assert!(GameType::for_game(0).is_none());
        assert!(GameType::for_game(6).is_none());
    }

    #[test]
    fn test_game_type_round_trip() {
        for game_number in 1..=TOTAL_GAMES {
            let game_type = GameType::for_game(game_number).unwrap();
            assert_eq!(GameType::parse(game_type.as_str()), Some(game_type));
        }
        assert!(GameType::parse("juggling").is_none());
    }
}
