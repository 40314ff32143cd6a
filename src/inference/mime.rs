use crate::models::MediaKind;

/// File extension for generated media, sniffed from its leading bytes.
pub fn detect_media_extension(bytes: &[u8], kind: MediaKind) -> &'static str {
    match bytes {
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x41, 0x56, 0x45, ..] => "wav",
        [0x66, 0x4C, 0x61, 0x43, ..] => "flac",
        [0x4F, 0x67, 0x67, 0x53, ..] => "ogg",
        [0x49, 0x44, 0x33, ..] | [0xFF, 0xFB, ..] | [0xFF, 0xF3, ..] => "mp3",
        [_, _, _, _, 0x66, 0x74, 0x79, 0x70, ..] => "mp4",
        [0x1A, 0x45, 0xDF, 0xA3, ..] => "webm",
        [0x47, 0x49, 0x46, 0x38, ..] => "gif",
        _ => {
            let fallback = match kind {
                MediaKind::Music => "wav",
                MediaKind::Video => "mp4",
            };
            tracing::warn!(
                "Unrecognized media format (first 4 bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(4)],
                fallback
            );
            fallback
        }
    }
}
