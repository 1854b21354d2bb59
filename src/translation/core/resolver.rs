//! 有效源语言解析
//!
//! 决定本次翻译的源语言来自用户手动选择，还是需要先做语言检测；
//! 并把检测结果归类为可翻译、按自动处理或拒绝。

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::{classify, CatalogMatch, Language, SourceLanguage};
use crate::translation::providers::Detection;

/// 检测失败时展示给用户的通用提示
pub const DETECTION_FAILED_MESSAGE: &str = "Could not detect language";

/// 源语言决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAction {
    UseManual(Language),
    RunDetection,
}

/// 检测结果的处理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// 可手动选择的语言，以其为源语言翻译
    Offered(Language),
    /// 支持但未提供的语言，仅作记录，翻译时按自动检测处理
    Unoffered { code: &'static str, name: &'static str },
    /// 不翻译，进入错误状态
    Rejected(TranslationError),
}

pub fn resolve_source(selected: SourceLanguage) -> SourceAction {
    match selected {
        SourceLanguage::Manual(language) => SourceAction::UseManual(language),
        SourceLanguage::Auto => SourceAction::RunDetection,
    }
}

pub fn resolve_detection(result: TranslationResult<Detection>) -> DetectionOutcome {
    let detection = match result {
        Ok(detection) => detection,
        Err(err) => {
            tracing::warn!("语言检测失败: {}", err);
            let err = if matches!(err, TranslationError::DetectionFailure(_)) {
                err
            } else {
                TranslationError::DetectionFailure(err.to_string())
            };
            return DetectionOutcome::Rejected(err);
        }
    };

    let unsupported = || {
        DetectionOutcome::Rejected(TranslationError::DetectionUnsupported(
            detection.language.clone(),
        ))
    };

    if !detection.supported {
        return unsupported();
    }

    match classify(&detection.language) {
        CatalogMatch::Offered(language) => DetectionOutcome::Offered(language),
        CatalogMatch::Unoffered { code, name } => {
            tracing::info!("检测到未提供手动选择的语言 {} ({}), 按自动检测翻译", name, code);
            DetectionOutcome::Unoffered { code, name }
        }
        CatalogMatch::Unsupported => unsupported(),
    }
}

/// 拒绝原因对应的用户可见消息
pub fn user_message(error: &TranslationError) -> String {
    match error {
        TranslationError::DetectionUnsupported(_) => error.to_string(),
        _ => DETECTION_FAILED_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(language: &str, supported: bool) -> TranslationResult<Detection> {
        Ok(Detection {
            language: language.to_string(),
            supported,
            score: 1.0,
        })
    }

    #[test]
    fn test_manual_selection_skips_detection() {
        assert_eq!(
            resolve_source(SourceLanguage::Manual(Language::German)),
            SourceAction::UseManual(Language::German)
        );
        assert_eq!(resolve_source(SourceLanguage::Auto), SourceAction::RunDetection);
    }

    #[test]
    fn test_offered_language_is_used() {
        assert_eq!(
            resolve_detection(detection("nl", true)),
            DetectionOutcome::Offered(Language::Dutch)
        );
    }

    #[test]
    fn test_unsupported_code_is_rejected_with_code() {
        let outcome = resolve_detection(detection("fr", true));
        match outcome {
            DetectionOutcome::Rejected(err) => {
                assert_eq!(err, TranslationError::DetectionUnsupported("fr".to_string()));
                assert!(user_message(&err).contains("fr"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_provider_unsupported_flag_wins() {
        assert!(matches!(
            resolve_detection(detection("nl", false)),
            DetectionOutcome::Rejected(TranslationError::DetectionUnsupported(_))
        ));
    }

    #[test]
    fn test_unoffered_language_resolves_to_auto() {
        assert_eq!(
            resolve_detection(detection("af", true)),
            DetectionOutcome::Unoffered {
                code: "af",
                name: "Afrikaans"
            }
        );
    }

    #[test]
    fn test_collaborator_failure_is_generic() {
        let outcome = resolve_detection(Err(TranslationError::NetworkError("reset".to_string())));
        match outcome {
            DetectionOutcome::Rejected(err) => {
                assert!(matches!(err, TranslationError::DetectionFailure(_)));
                assert_eq!(user_message(&err), DETECTION_FAILED_MESSAGE);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
