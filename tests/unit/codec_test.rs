//! Unit tests for the image codec

use headshot_studio::codec::{self, MimeType};
use headshot_studio::AppError;
use std::io::Write;
use tokio_test::assert_ok;

const JPEG: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01];

#[test]
fn test_round_trip_for_accepted_types() {
    for mime in MimeType::ACCEPTED {
        let data: Vec<u8> = (0u8..=255).collect();
        let encoded = codec::encode(&data, mime.as_str());
        let (bytes, decoded_mime) = codec::decode(encoded.as_str()).unwrap();
        assert_eq!(bytes, data);
        assert_eq!(decoded_mime, mime.as_str());
    }
}

#[test]
fn test_decode_rejects_bad_payload() {
    assert!(matches!(
        codec::decode("data:image/png;base64,@@@"),
        Err(AppError::PreviewEncodingFailed)
    ));
}

#[test]
fn test_extension_defaults_to_png() {
    assert_eq!(codec::extension_for("image/png"), "png");
    assert_eq!(codec::extension_for("image/webp"), "webp");
    assert_eq!(codec::extension_for("nonsense"), codec::DEFAULT_EXTENSION);
}

#[tokio::test]
async fn test_encode_file_sniffs_type() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&JPEG).unwrap();

    let encoded = assert_ok!(codec::encode_file(file.path(), None).await);
    assert!(encoded.as_str().starts_with("data:image/jpeg;base64,"));

    let (bytes, mime) = assert_ok!(codec::decode(encoded.as_str()));
    assert_eq!(bytes, JPEG);
    assert_eq!(mime, "image/jpeg");
}

#[tokio::test]
async fn test_encode_file_honours_declared_type() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&JPEG).unwrap();

    let encoded = codec::encode_file(file.path(), Some("image/webp")).await.unwrap();
    assert!(encoded.as_str().starts_with("data:image/webp;base64,"));
}

#[tokio::test]
async fn test_encode_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");
    assert!(matches!(
        codec::encode_file(&missing, None).await,
        Err(AppError::PreviewEncodingFailed)
    ));
}

#[tokio::test]
async fn test_encode_empty_file_fails() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(matches!(
        codec::encode_file(file.path(), Some("image/png")).await,
        Err(AppError::PreviewEncodingFailed)
    ));
}

#[tokio::test]
async fn test_encode_file_rejects_unsupported_type() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"GIF89a-------").unwrap();
    assert!(matches!(
        codec::encode_file(file.path(), None).await,
        Err(AppError::UnsupportedMediaType(_))
    ));
}
