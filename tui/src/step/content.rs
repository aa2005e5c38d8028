//! Text-only projections of a message body.

use transcript_protocol::ContentItem;
use transcript_protocol::MessageContent;

/// Returns the text parts of `content` joined by newlines, dropping images.
///
/// This is the value shown on screen and copied to the clipboard, so
/// whitespace is preserved. Content that failed to parse yields `""`.
pub fn strip_images(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(|part| match part {
                ContentItem::Text { text } => Some(text.as_str()),
                ContentItem::ImageUrl { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        MessageContent::Unsupported(_) => String::new(),
    }
}

/// [`strip_images`] trimmed for the truncation heuristic.
pub fn normalize_for_truncation(content: &MessageContent) -> String {
    strip_images(content).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use transcript_protocol::models::ImageUrl;

    fn image() -> ContentItem {
        ContentItem::ImageUrl {
            image_url: ImageUrl {
                url: "data:image/png;base64,AAAA".to_string(),
            },
        }
    }

    #[test]
    fn drops_images_between_text_parts() {
        let content = MessageContent::Parts(vec![
            ContentItem::Text {
                text: "before".to_string(),
            },
            image(),
            ContentItem::Text {
                text: "after ".to_string(),
            },
        ]);

        assert_eq!(strip_images(&content), "before\nafter ");
        assert_eq!(normalize_for_truncation(&content), "before\nafter");
    }

    #[test]
    fn image_only_message_is_empty() {
        let content = MessageContent::Parts(vec![image()]);
        assert_eq!(strip_images(&content), "");
    }

    #[test]
    fn plain_text_keeps_surrounding_whitespace_for_display() {
        let content = MessageContent::from("  indented\n");
        assert_eq!(strip_images(&content), "  indented\n");
        assert_eq!(normalize_for_truncation(&content), "indented");
    }

    #[test]
    fn unsupported_content_degrades_to_empty() {
        let content = MessageContent::Unsupported(serde_json::json!(42));
        assert_eq!(strip_images(&content), "");
    }
}
