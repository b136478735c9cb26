mod common;

use common::{
    encode_image, jpeg_file, png_file, sample_image, FlakyCompressor, MemoryDownloadSink,
    MockCompressor,
};
use image::{GenericImageView, ImageFormat};
use img_squeeze_session::constants::{COMPRESSION_FAILED_MESSAGE, UNSUPPORTED_MEDIA_TYPE_MESSAGE};
use img_squeeze_session::{
    ApplyOutcome, Host, ImageCompressionSession, ImageCompressor, ImageFile, RecordingNotifier,
    SessionError, SessionPhase,
};

fn session_with(
    compressor: MockCompressor,
) -> (ImageCompressionSession<MockCompressor, RecordingNotifier>, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    (ImageCompressionSession::new(compressor, notifier.clone()), notifier)
}

#[tokio::test]
async fn test_submit_png_reports_fifty_percent_savings() {
    let compressor = MockCompressor::fixed(2_500_000);
    let (mut session, notifier) = session_with(compressor.clone());

    session.set_quality(80);
    session.submit_image(png_file("big.png", 5_000_000)).await.unwrap();

    let calls = compressor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].quality, 0.8);
    assert_eq!(calls[0].max_size_mb, 10.0);
    assert_eq!(calls[0].max_width_or_height, 1920);
    assert!(calls[0].use_worker);

    let summary = session.summary().unwrap();
    assert_eq!(summary.compressed_size, 2_500_000);
    assert_eq!(summary.savings.to_string(), "50.0%");
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_unsupported_media_type_leaves_state_untouched() {
    let (mut session, notifier) = session_with(MockCompressor::fixed(10));
    session.submit_image(png_file("keep.png", 100)).await.unwrap();
    let generation = session.generation();

    for declared in ["image/gif", "image/webp", "image/PNG", "text/plain", ""] {
        let file = ImageFile::new("bad.bin", declared, vec![1u8; 50]);
        let result = session.submit_image(file).await;
        assert!(matches!(result, Err(SessionError::UnsupportedMediaType(_))));
    }

    assert_eq!(session.original().unwrap().name(), "keep.png");
    assert_eq!(session.compressed().unwrap().size(), 10);
    assert_eq!(session.generation(), generation);
    assert_eq!(session.phase(), SessionPhase::HasCompressed);

    let messages = notifier.messages();
    assert_eq!(messages.len(), 5);
    assert!(messages.iter().all(|m| m == UNSUPPORTED_MEDIA_TYPE_MESSAGE));
}

#[tokio::test]
async fn test_rejected_first_upload_stays_empty() {
    let (mut session, _notifier) = session_with(MockCompressor::fixed(10));

    let result = session
        .submit_image(ImageFile::new("a.gif", "image/gif", vec![0u8; 8]))
        .await;

    assert!(result.is_err());
    assert_eq!(session.phase(), SessionPhase::Empty);
}

#[tokio::test]
async fn test_savings_can_be_negative() {
    let (mut session, _notifier) = session_with(MockCompressor::fixed(1_200));

    session.submit_image(jpeg_file("tiny.jpg", 1_000)).await.unwrap();

    let summary = session.summary().unwrap();
    assert_eq!(summary.savings.percent(), -20.0);
    assert_eq!(summary.savings.to_string(), "-20.0%");
}

#[tokio::test]
async fn test_set_quality_batches_until_commit() {
    let compressor = MockCompressor::quality_scaled();
    let (mut session, _notifier) = session_with(compressor.clone());
    session.submit_image(png_file("a.png", 1_000)).await.unwrap();

    session.set_quality(50);
    session.set_quality(90);
    assert_eq!(compressor.calls().len(), 1);

    session.commit_quality().await.unwrap();

    let calls = compressor.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].quality, 0.9);
    assert_eq!(session.compressed().unwrap().size(), 900);
}

#[tokio::test]
async fn test_recompress_is_idempotent() {
    let (mut session, _notifier) = session_with(MockCompressor::quality_scaled());
    session.accept_image(png_file("a.png", 4_000)).unwrap();

    let first = session.recompress().await.unwrap().unwrap();
    let second = session.recompress().await.unwrap().unwrap();

    assert_eq!(first.compressed_size, second.compressed_size);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_recompress_without_original_is_noop() {
    let compressor = MockCompressor::fixed(1);
    let (mut session, notifier) = session_with(compressor.clone());

    assert!(session.recompress().await.unwrap().is_none());
    assert!(session.commit_quality().await.unwrap().is_none());
    assert!(compressor.calls().is_empty());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_submit_replaces_previous_result() {
    let (mut session, _notifier) = session_with(MockCompressor::quality_scaled());
    session.submit_image(png_file("first.png", 1_000)).await.unwrap();

    session.accept_image(jpeg_file("second.jpg", 2_000)).unwrap();
    assert_eq!(session.phase(), SessionPhase::HasOriginal);
    assert!(session.compressed().is_none());

    session.recompress().await.unwrap();
    assert_eq!(session.summary().unwrap().original_size, 2_000);
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let compressor = MockCompressor::quality_scaled();
    let (mut session, _notifier) = session_with(compressor.clone());
    session.accept_image(png_file("a.png", 1_000)).unwrap();

    session.set_quality(20);
    let slow = session.begin_compression().unwrap();
    session.set_quality(70);
    let fast = session.begin_compression().unwrap();
    assert!(fast.generation() > slow.generation());

    let fast_done = fast.run(&compressor).await;
    let slow_done = slow.run(&compressor).await;

    assert!(matches!(session.apply(fast_done).unwrap(), ApplyOutcome::Updated(_)));
    let outcome = session.apply(slow_done).unwrap();
    assert!(matches!(outcome, ApplyOutcome::Stale { latest, .. } if latest == session.generation()));

    assert_eq!(session.compressed().unwrap().size(), 700);
    assert_eq!(session.compressed().unwrap().quality(), 0.7);
}

#[tokio::test]
async fn test_response_for_replaced_original_is_discarded() {
    let compressor = MockCompressor::quality_scaled();
    let (mut session, _notifier) = session_with(compressor.clone());
    session.accept_image(png_file("old.png", 1_000)).unwrap();
    let request = session.begin_compression().unwrap();

    session.accept_image(png_file("new.png", 3_000)).unwrap();
    let response = request.run(&compressor).await;

    assert!(matches!(session.apply(response).unwrap(), ApplyOutcome::Stale { .. }));
    assert_eq!(session.phase(), SessionPhase::HasOriginal);
}

#[tokio::test]
async fn test_failed_compression_notifies_and_keeps_last_good() {
    let notifier = RecordingNotifier::new();
    let mut session =
        ImageCompressionSession::new(FlakyCompressor::succeeding_first(1), notifier.clone());

    session.submit_image(png_file("a.png", 1_000)).await.unwrap();
    assert_eq!(session.compressed().unwrap().size(), 250);

    session.set_quality(10);
    let result = session.commit_quality().await;
    assert!(matches!(result, Err(SessionError::CompressionFailure(_))));

    assert_eq!(session.phase(), SessionPhase::HasCompressed);
    assert_eq!(session.compressed().unwrap().size(), 250);
    assert!(!session.is_result_current());
    assert_eq!(notifier.messages(), vec![COMPRESSION_FAILED_MESSAGE]);
}

#[tokio::test]
async fn test_submit_succeeds_even_when_compression_fails() {
    let notifier = RecordingNotifier::new();
    let mut session = ImageCompressionSession::new(FlakyCompressor::failing(), notifier.clone());

    session.submit_image(png_file("a.png", 1_000)).await.unwrap();

    assert_eq!(session.phase(), SessionPhase::HasOriginal);
    assert_eq!(notifier.messages(), vec![COMPRESSION_FAILED_MESSAGE]);

    let sink = MemoryDownloadSink::default();
    assert_eq!(session.download_compressed_result(&sink).unwrap(), None);
    assert!(sink.saved().is_empty());
}

#[tokio::test]
async fn test_download_uses_derived_name() {
    let (mut session, _notifier) = session_with(MockCompressor::fixed(321));
    session.submit_image(png_file("photo.png", 1_000)).await.unwrap();

    let sink = MemoryDownloadSink::default();
    let name = session.download_compressed_result(&sink).unwrap();

    assert_eq!(name.as_deref(), Some("photo_compressed.png"));
    assert_eq!(sink.saved(), vec![("photo_compressed.png".to_string(), 321)]);
}

#[tokio::test]
async fn test_download_names_without_extension() {
    let (mut session, _notifier) = session_with(MockCompressor::fixed(5));
    session.submit_image(jpeg_file("noext", 10)).await.unwrap();

    let sink = MemoryDownloadSink::default();
    let name = session.download_compressed_result(&sink).unwrap().unwrap();

    assert!(name.contains("noext"));
    assert!(name.contains("_compressed"));
}

#[test]
fn test_download_before_compression_is_silent_noop() {
    let (session, notifier) = session_with(MockCompressor::fixed(5));
    let sink = MemoryDownloadSink::default();

    assert_eq!(session.download_compressed_result(&sink).unwrap(), None);
    assert!(sink.saved().is_empty());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_real_compressor_caps_dimensions() {
    let source = encode_image(&sample_image(2_000, 750), ImageFormat::Jpeg);
    let notifier = RecordingNotifier::new();
    let mut session = ImageCompressionSession::new(ImageCompressor::new(), notifier.clone());

    session
        .submit_image(ImageFile::new("wide.jpg", "image/jpeg", source))
        .await
        .unwrap();

    let result = session.compressed().unwrap();
    let decoded = image::load_from_memory(result.blob().bytes()).unwrap();
    assert!(decoded.width().max(decoded.height()) <= 1920);
    assert_eq!(decoded.dimensions(), (1920, 720));
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_real_compressor_rejects_corrupt_data() {
    let notifier = RecordingNotifier::new();
    let mut session = ImageCompressionSession::new(ImageCompressor::new(), notifier.clone());

    session
        .submit_image(ImageFile::new("broken.png", "image/png", b"\x89PNG garbage".to_vec()))
        .await
        .unwrap();

    assert_eq!(session.phase(), SessionPhase::HasOriginal);
    assert_eq!(notifier.messages(), vec![COMPRESSION_FAILED_MESSAGE]);
}

#[tokio::test]
async fn test_host_script_applies_latest_quality() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("photo.png");
    std::fs::write(&path, vec![0u8; 1_000]).unwrap();

    let compressor = MockCompressor::quality_scaled();
    let notifier = RecordingNotifier::new();
    let session = ImageCompressionSession::new(compressor.clone(), notifier.clone());
    let sink = MemoryDownloadSink::default();
    let mut host = Host::new(session, &sink);

    let script = format!(
        "open {}\nquality 50\nquality 90\ncommit\ndownload\nquit\n",
        path.display()
    );
    host.run(script.as_bytes()).await.unwrap();

    let session = host.into_session();
    assert_eq!(session.compressed().unwrap().quality(), 0.9);
    assert_eq!(session.compressed().unwrap().size(), 900);
    assert_eq!(compressor.calls().len(), 2);
    assert_eq!(sink.saved(), vec![("photo_compressed.png".to_string(), 900)]);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_host_reports_unreadable_and_unsupported_files() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let text = temp_dir.path().join("notes.txt");
    std::fs::write(&text, b"hello").unwrap();

    let notifier = RecordingNotifier::new();
    let session = ImageCompressionSession::new(MockCompressor::fixed(1), notifier.clone());
    let sink = MemoryDownloadSink::default();
    let mut host = Host::new(session, &sink);

    let script = format!(
        "open {}\nopen {}\nbogus\ndownload\n",
        temp_dir.path().join("missing.png").display(),
        text.display()
    );
    host.run(script.as_bytes()).await.unwrap();

    assert_eq!(host.session().phase(), SessionPhase::Empty);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("missing.png"));
    assert_eq!(messages[1], UNSUPPORTED_MEDIA_TYPE_MESSAGE);
    assert!(sink.saved().is_empty());
}
