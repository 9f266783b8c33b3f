//! Encoding of the array-valued `chat_messages` columns.

use super::models::StoredEmoteRef;
use crate::DbError;

pub(super) fn encode_badge_ids(ids: &[i64]) -> Result<String, DbError> {
    Ok(serde_json::to_string(ids)?)
}

/// NULL and empty text read as no badges.
pub(super) fn decode_badge_ids(text: Option<&str>) -> Result<Vec<i64>, DbError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(text)?),
        _ => Ok(Vec::new()),
    }
}

pub(super) fn encode_emote_refs(refs: &[StoredEmoteRef]) -> Result<String, DbError> {
    Ok(serde_json::to_string(refs)?)
}

pub(super) fn decode_emote_refs(text: Option<&str>) -> Result<Vec<StoredEmoteRef>, DbError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(text)?),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_ids_encode_as_json_array() {
        assert_eq!(encode_badge_ids(&[3, 1]).unwrap(), "[3,1]");
        assert_eq!(decode_badge_ids(Some("[3,1]")).unwrap(), vec![3, 1]);
        assert!(decode_badge_ids(None).unwrap().is_empty());
        assert!(decode_badge_ids(Some("")).unwrap().is_empty());
    }

    #[test]
    fn emote_refs_keep_offsets() {
        let refs = vec![StoredEmoteRef { id: 7, start: 0, end: 4 }];
        let text = encode_emote_refs(&refs).unwrap();
        assert_eq!(text, r#"[{"id":7,"start":0,"end":4}]"#);
        assert_eq!(decode_emote_refs(Some(&text)).unwrap(), refs);
    }

    #[test]
    fn malformed_columns_are_errors() {
        assert!(matches!(decode_badge_ids(Some("{1,2}")), Err(DbError::Json(_))));
        assert!(matches!(decode_emote_refs(Some("[1]")), Err(DbError::Json(_))));
    }
}
