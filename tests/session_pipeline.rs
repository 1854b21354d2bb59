//! 翻译会话集成测试
//!
//! 使用暂停的 tokio 时钟驱动防抖与延迟响应，验证会话端到端的行为

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use std::time::Duration;

use common::{session_config, Call, TestEnvironment};
use intersection::translation::{
    start_session, Language, RecordingStatus, SessionCommand, SessionHandle, SourceLanguage,
    TranslationSession, TranslationStatus,
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

async fn input(session: &SessionHandle, text: &str) {
    session
        .send(SessionCommand::Input(text.to_string()))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_detects_and_translates_once() {
    let env = TestEnvironment::default();
    let session = TranslationSession::spawn(env.backend.clone(), session_config(SourceLanguage::Auto));

    for text in ["H", "Ha", "Hal", "Hall", "Hallo"] {
        input(&session, text).await;
        tokio::time::sleep(ms(50)).await;
    }
    tokio::time::sleep(ms(300)).await;

    assert_eq!(env.backend.detect_calls(), vec!["Hallo".to_string()]);
    let translations = env.backend.translate_calls();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[0].from, Some(Language::Dutch));
    assert_eq!(translations[0].to, Language::English);

    let state = session.state();
    assert_eq!(state.status, TranslationStatus::Success);
    assert_eq!(state.translated_text, "Hallo (en)");
    assert_eq!(state.detected_language, SourceLanguage::Manual(Language::Dutch));

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_detection_reports_code_without_translating() {
    let env = TestEnvironment::default();
    env.backend.detect_as("Bonjour", "fr", false);
    let session = TranslationSession::spawn(env.backend.clone(), session_config(SourceLanguage::Auto));

    input(&session, "Bonjour").await;
    tokio::time::sleep(ms(500)).await;

    let state = session.state();
    assert_eq!(state.status, TranslationStatus::Error);
    assert!(state.error_message.contains("fr"));
    assert!(!state.limit_exceeded);
    assert_eq!(state.detected_language, SourceLanguage::Auto);
    assert!(env.backend.translate_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unoffered_language_translates_with_auto_source() {
    let env = TestEnvironment::default();
    env.backend.detect_as("Goeie more", "af", true);
    let session = TranslationSession::spawn(env.backend.clone(), session_config(SourceLanguage::Auto));

    // 先得到一个可选语言的检测结果
    input(&session, "Hallo").await;
    tokio::time::sleep(ms(500)).await;
    assert_eq!(session.state().detected_language, SourceLanguage::Manual(Language::Dutch));

    input(&session, "Goeie more").await;
    tokio::time::sleep(ms(500)).await;

    let translations = env.backend.translate_calls();
    assert_eq!(translations.len(), 2);
    assert_eq!(translations[0].from, Some(Language::Dutch));
    assert_eq!(translations[1].from, None);

    let state = session.state();
    assert_eq!(state.status, TranslationStatus::Success);
    assert_eq!(state.translated_text, "Goeie more (en)");
    assert_eq!(state.detected_language, SourceLanguage::Auto);

    let snapshot = session.snapshot().unwrap();
    assert_eq!(snapshot.from, SourceLanguage::Auto.name());
    assert_ne!(snapshot.from, Language::Dutch.name());
}

#[tokio::test(start_paused = true)]
async fn test_slow_stale_translation_never_overwrites_newer_result() {
    let env = TestEnvironment::default();
    env.backend.delay_translation("Hal", ms(500));
    env.backend.delay_translation("Hallo", ms(10));
    let session = TranslationSession::spawn(
        env.backend.clone(),
        session_config(SourceLanguage::Manual(Language::Dutch)),
    );

    input(&session, "Hal").await;
    tokio::time::sleep(ms(250)).await;
    input(&session, "Hallo").await;
    tokio::time::sleep(ms(250)).await;

    assert_eq!(session.state().translated_text, "Hallo (en)");

    // "Hal" 的慢响应在此期间到达并被丢弃
    tokio::time::sleep(ms(500)).await;
    assert_eq!(env.backend.translate_calls().len(), 2);
    assert_eq!(session.state().translated_text, "Hallo (en)");
    assert_eq!(session.state().status, TranslationStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_session_flags_rejection() {
    let env = TestEnvironment::with_limit(2);
    let session = start_session(
        env.backend.clone(),
        env.limiter.clone(),
        "u1",
        session_config(SourceLanguage::Manual(Language::German)),
    );

    input(&session, "Guten").await;
    tokio::time::sleep(ms(300)).await;
    input(&session, "Guten Tag").await;
    tokio::time::sleep(ms(300)).await;
    assert_eq!(session.state().status, TranslationStatus::Success);

    input(&session, "Guten Tag!").await;
    tokio::time::sleep(ms(300)).await;

    let state = session.state();
    assert_eq!(state.status, TranslationStatus::Error);
    assert!(state.limit_exceeded);
    assert_eq!(state.error_message, "Rate limit exceeded");
    assert_eq!(state.translated_text, "");
    // 被拒绝的请求不会到达后端
    assert_eq!(env.backend.translate_calls().len(), 2);
    assert_eq!(env.store.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_clear_discards_in_flight_detection() {
    let env = TestEnvironment::default();
    env.backend.delay_detection(ms(100));
    let session = TranslationSession::spawn(env.backend.clone(), session_config(SourceLanguage::Auto));

    input(&session, "Hallo").await;
    tokio::time::sleep(ms(250)).await;
    assert_eq!(session.state().status, TranslationStatus::Loading);

    session.send(SessionCommand::Clear).await.unwrap();
    tokio::time::sleep(ms(500)).await;

    let state = session.state();
    assert_eq!(state.input, "");
    assert_eq!(state.status, TranslationStatus::Idle);
    assert_eq!(state.detected_language, SourceLanguage::Auto);
    assert_eq!(env.backend.detect_calls().len(), 1);
    assert!(env.backend.translate_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_target_change_retranslates_current_input() {
    let env = TestEnvironment::default();
    let session = TranslationSession::spawn(
        env.backend.clone(),
        session_config(SourceLanguage::Manual(Language::Dutch)),
    );

    input(&session, "Hallo").await;
    tokio::time::sleep(ms(300)).await;
    assert_eq!(session.state().translated_text, "Hallo (en)");

    session
        .send(SessionCommand::SelectTarget(Language::German))
        .await
        .unwrap();
    tokio::time::sleep(ms(10)).await;

    let translations = env.backend.translate_calls();
    assert_eq!(translations.len(), 2);
    assert_eq!(translations[1].to, Language::German);
    assert_eq!(session.state().translated_text, "Hallo (de)");
}

#[tokio::test(start_paused = true)]
async fn test_voice_input_is_transcribed_then_translated() {
    let env = TestEnvironment::default();
    env.backend.transcribe_as("Goedemorgen");
    let session = TranslationSession::spawn(env.backend.clone(), session_config(SourceLanguage::Auto));

    // 自动检测模式下不能录音
    session.send(SessionCommand::StartRecording).await.unwrap();
    tokio::time::sleep(ms(10)).await;
    assert_eq!(session.state().recording_status, RecordingStatus::Idle);

    session
        .send(SessionCommand::SelectSource(SourceLanguage::Manual(Language::Dutch)))
        .await
        .unwrap();
    session.send(SessionCommand::StartRecording).await.unwrap();
    input(&session, "typed while recording").await;
    tokio::time::sleep(ms(10)).await;

    let state = session.state();
    assert_eq!(state.recording_status, RecordingStatus::Recording);
    assert_eq!(state.input, "");

    session
        .send(SessionCommand::StopRecording(vec![0x52, 0x49, 0x46, 0x46]))
        .await
        .unwrap();
    tokio::time::sleep(ms(300)).await;

    let state = session.state();
    assert_eq!(state.recording_status, RecordingStatus::Idle);
    assert_eq!(state.input, "Goedemorgen");
    assert_eq!(state.translated_text, "Goedemorgen (en)");
    assert!(env
        .backend
        .calls()
        .contains(&Call::Transcribe(Language::Dutch)));

    let snapshot = session.snapshot().unwrap();
    assert_eq!(snapshot.from, "Dutch");
    assert_eq!(snapshot.to, "English");
    assert_eq!(snapshot.from_text, "Goedemorgen");
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_recording_transcription_is_ignored() {
    let env = TestEnvironment::default();
    env.backend.transcribe_as("Oude opname");
    env.backend.delay_transcription(ms(200));
    let session = TranslationSession::spawn(
        env.backend.clone(),
        session_config(SourceLanguage::Manual(Language::Dutch)),
    );

    session.send(SessionCommand::StartRecording).await.unwrap();
    session
        .send(SessionCommand::StopRecording(vec![0x52, 0x49, 0x46, 0x46]))
        .await
        .unwrap();
    tokio::time::sleep(ms(10)).await;
    assert_eq!(session.state().recording_status, RecordingStatus::Stopped);

    // 转写仍在进行时放弃这次录音并开始新的录音
    session.send(SessionCommand::ResetRecording).await.unwrap();
    session.send(SessionCommand::StartRecording).await.unwrap();
    tokio::time::sleep(ms(500)).await;

    let state = session.state();
    assert_eq!(state.recording_status, RecordingStatus::Recording);
    assert_eq!(state.input, "");
    assert_eq!(state.status, TranslationStatus::Idle);
    assert!(env.backend.translate_calls().is_empty());
    assert_eq!(
        env.backend.calls(),
        vec![Call::Transcribe(Language::Dutch)]
    );

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_state_updates_are_published() {
    let env = TestEnvironment::default();
    let session = TranslationSession::spawn(
        env.backend.clone(),
        session_config(SourceLanguage::Manual(Language::Dutch)),
    );
    let mut updates = session.subscribe();

    input(&session, "Hallo").await;
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().input, "Hallo");

    tokio::time::sleep(ms(300)).await;
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow().status, TranslationStatus::Success);

    assert_eq!(env.backend.translate_calls().len(), 1);
    session.shutdown().await;
}
