use serde::Deserialize;
use uuid::Uuid;

use super::document::RichTextDocument;

/// The editable fields of a blog
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DraftFields {
    pub title: String,
    pub content: RichTextDocument,
    pub title_tamil: String,
    pub content_tamil: RichTextDocument,
    pub category_id: Option<Uuid>,
}

/// A partial edit; absent fields are left unchanged. `category_id: null`
/// clears the category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub content: Option<RichTextDocument>,
    pub title_tamil: Option<String>,
    pub content_tamil: Option<RichTextDocument>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<Uuid>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

impl DraftPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.title_tamil.is_none()
            && self.content_tamil.is_none()
            && self.category_id.is_none()
    }
}

/// In-memory draft of one blog: the local values plus the last values known
/// to be on the server.
#[derive(Debug, Clone)]
pub struct BlogDraft {
    current: DraftFields,
    synced: DraftFields,
}

/// Adopt `incoming` if it differs from the last synced value, but keep a
/// local edit. Returns whether the local value changed.
fn reconcile_field<T: PartialEq + Clone>(current: &mut T, synced: &mut T, incoming: &T) -> bool {
    if incoming == synced {
        return false;
    }

    let edited_locally = current != synced;
    *synced = incoming.clone();
    if edited_locally {
        return false;
    }

    *current = incoming.clone();
    true
}

impl BlogDraft {
    /// Draft of freshly loaded server data
    pub fn from_server(fields: DraftFields) -> Self {
        Self {
            current: fields.clone(),
            synced: fields,
        }
    }

    pub fn fields(&self) -> &DraftFields {
        &self.current
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.synced
    }

    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(title) = patch.title {
            self.current.title = title;
        }
        if let Some(content) = patch.content {
            self.current.content = content;
        }
        if let Some(title_tamil) = patch.title_tamil {
            self.current.title_tamil = title_tamil;
        }
        if let Some(content_tamil) = patch.content_tamil {
            self.current.content_tamil = content_tamil;
        }
        if let Some(category_id) = patch.category_id {
            self.current.category_id = category_id;
        }
    }

    /// Re-sync against freshly loaded server data without clobbering
    /// unsaved local edits. Returns whether any local value changed.
    pub fn reconcile(&mut self, incoming: &DraftFields) -> bool {
        let c = &mut self.current;
        let s = &mut self.synced;

        // Non-short-circuiting so every field is visited
        reconcile_field(&mut c.title, &mut s.title, &incoming.title)
            | reconcile_field(&mut c.content, &mut s.content, &incoming.content)
            | reconcile_field(&mut c.title_tamil, &mut s.title_tamil, &incoming.title_tamil)
            | reconcile_field(&mut c.content_tamil, &mut s.content_tamil, &incoming.content_tamil)
            | reconcile_field(&mut c.category_id, &mut s.category_id, &incoming.category_id)
    }

    /// Record that `saved` reached the server. Edits made after the snapshot
    /// was taken keep the draft dirty.
    pub fn mark_saved(&mut self, saved: DraftFields) {
        self.synced = saved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str, body: &str) -> DraftFields {
        DraftFields {
            title: title.to_string(),
            content: RichTextDocument::from_plain_text(body),
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_marks_dirty() {
        let mut draft = BlogDraft::from_server(fields("Rain", "drops"));
        assert!(!draft.is_dirty());

        draft.apply(DraftPatch {
            title: Some("Monsoon".to_string()),
            ..Default::default()
        });

        assert!(draft.is_dirty());
        assert_eq!(draft.fields().title, "Monsoon");
        assert_eq!(draft.fields().content.plain_text(), "drops");
    }

    #[test]
    fn test_reconcile_adopts_changed_server_values() {
        let mut draft = BlogDraft::from_server(fields("Rain", "drops"));

        assert!(draft.reconcile(&fields("Rain", "puddles")));
        assert_eq!(draft.fields().content.plain_text(), "puddles");
        assert!(!draft.is_dirty());
    }

    #[test]
    fn test_reconcile_keeps_local_edits() {
        let mut draft = BlogDraft::from_server(fields("Rain", "drops"));
        draft.apply(DraftPatch {
            title: Some("Monsoon".to_string()),
            ..Default::default()
        });

        // Server changed both fields; only the untouched one follows
        let changed = draft.reconcile(&fields("Storm", "puddles"));

        assert!(changed);
        assert_eq!(draft.fields().title, "Monsoon");
        assert_eq!(draft.fields().content.plain_text(), "puddles");
        assert!(draft.is_dirty());
    }

    #[test]
    fn test_reconcile_ignores_unchanged_server_values() {
        let mut draft = BlogDraft::from_server(fields("Rain", "drops"));
        draft.apply(DraftPatch {
            title: Some("Monsoon".to_string()),
            ..Default::default()
        });

        assert!(!draft.reconcile(&fields("Rain", "drops")));
        assert_eq!(draft.fields().title, "Monsoon");
    }

    #[test]
    fn test_mark_saved_keeps_later_edits_dirty() {
        let mut draft = BlogDraft::from_server(fields("Rain", "drops"));
        draft.apply(DraftPatch {
            title: Some("Monsoon".to_string()),
            ..Default::default()
        });
        let snapshot = draft.fields().clone();

        draft.apply(DraftPatch {
            title: Some("Monsoon II".to_string()),
            ..Default::default()
        });
        draft.mark_saved(snapshot);
        assert!(draft.is_dirty());

        let snapshot = draft.fields().clone();
        draft.mark_saved(snapshot);
        assert!(!draft.is_dirty());
    }

    #[test]
    fn test_patch_distinguishes_null_category_from_absent() {
        let patch: DraftPatch = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(patch.category_id, Some(None));

        let patch: DraftPatch = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(patch.category_id, None);
        assert!(!patch.is_empty());
    }
}
