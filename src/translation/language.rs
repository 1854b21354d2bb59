//! 语言目录
//!
//! 手动可选的语言、语言代码与显示名称的互转、语音识别区域代码，
//! 以及"提供方支持但未在界面上提供"的语言集合。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::TranslationError;

/// 用户可手动选择的语言（也是所有合法的目标语言）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "de")]
    German,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Dutch, Language::German];

    /// ISO 639-1 代码
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Dutch => "nl",
            Language::German => "de",
        }
    }

    /// 显示名称
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Dutch => "Dutch",
            Language::German => "German",
        }
    }

    /// 语音识别使用的区域代码
    pub fn speech_locale(self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Dutch => "nl-NL",
            Language::German => "de-DE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
            .or_else(|| Self::from_name(s))
            .ok_or_else(|| TranslationError::InvalidInput(format!("unknown language '{}'", s)))
    }
}

/// 源语言选择：自动检测或手动指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceLanguage {
    #[default]
    Auto,
    Manual(Language),
}

impl SourceLanguage {
    pub fn is_auto(self) -> bool {
        matches!(self, SourceLanguage::Auto)
    }

    /// 手动选择的语言代码；自动检测时为 None
    pub fn code(self) -> Option<&'static str> {
        match self {
            SourceLanguage::Auto => None,
            SourceLanguage::Manual(lang) => Some(lang.code()),
        }
    }

    pub fn language(self) -> Option<Language> {
        match self {
            SourceLanguage::Auto => None,
            SourceLanguage::Manual(lang) => Some(lang),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceLanguage::Auto => "Detect",
            SourceLanguage::Manual(lang) => lang.name(),
        }
    }
}

impl From<Language> for SourceLanguage {
    fn from(lang: Language) -> Self {
        SourceLanguage::Manual(lang)
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceLanguage {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "detect" | "" => Ok(SourceLanguage::Auto),
            other => other.parse::<Language>().map(SourceLanguage::Manual),
        }
    }
}

impl TryFrom<String> for SourceLanguage {
    type Error = TranslationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceLanguage> for String {
    fn from(value: SourceLanguage) -> Self {
        value.code().unwrap_or("auto").to_string()
    }
}

/// 提供方支持、但界面未提供手动选择的语言
pub const SUPPORTED_UNOFFERED: &[(&str, &str)] = &[("af", "Afrikaans")];

/// 检测结果在目录中的归类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMatch {
    /// 可手动选择的语言
    Offered(Language),
    /// 支持但未提供，翻译时按自动检测处理
    Unoffered { code: &'static str, name: &'static str },
    /// 不支持
    Unsupported,
}

/// 在语言目录中查找检测到的代码
pub fn classify(code: &str) -> CatalogMatch {
    if let Some(lang) = Language::from_code(code) {
        return CatalogMatch::Offered(lang);
    }

    let code = code.trim();
    SUPPORTED_UNOFFERED
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(code))
        .map(|&(code, name)| CatalogMatch::Unoffered { code, name })
        .unwrap_or(CatalogMatch::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_name_roundtrip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
            assert_eq!(Language::from_name(lang.name()), Some(lang));
        }
        assert_eq!(Language::from_code("NL"), Some(Language::Dutch));
        assert_eq!("German".parse::<Language>().unwrap(), Language::German);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_source_language_parsing() {
        assert_eq!("auto".parse::<SourceLanguage>().unwrap(), SourceLanguage::Auto);
        assert_eq!("Detect".parse::<SourceLanguage>().unwrap(), SourceLanguage::Auto);
        assert_eq!(
            "de".parse::<SourceLanguage>().unwrap(),
            SourceLanguage::Manual(Language::German)
        );
        assert_eq!(SourceLanguage::Auto.code(), None);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Language::Dutch).unwrap();
        assert_eq!(json, "\"nl\"");

        let source: SourceLanguage = serde_json::from_str("\"auto\"").unwrap();
        assert!(source.is_auto());
        let json = serde_json::to_string(&SourceLanguage::Manual(Language::English)).unwrap();
        assert_eq!(json, "\"en\"");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("nl"), CatalogMatch::Offered(Language::Dutch));
        assert_eq!(
            classify("af"),
            CatalogMatch::Unoffered {
                code: "af",
                name: "Afrikaans"
            }
        );
        assert_eq!(classify("fr"), CatalogMatch::Unsupported);
    }
}
