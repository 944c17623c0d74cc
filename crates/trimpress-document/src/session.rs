// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One uploaded manuscript: its layout state, the edits applied to it, and
// the last successful export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use trimpress_core::error::Result;
use trimpress_core::geometry::BleedSpec;
use trimpress_core::types::{PlacementPolicy, SourceKind, Unit};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::compose::{Compositor, OutputDocument};
use crate::extract::{ContentExtractor, ExtractionStatus};
use crate::layout::LayoutState;
use crate::traits::OutputWriter;

/// An edit from the page editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Gesture {
    MoveUp { index: usize },
    MoveDown { index: usize },
    Delete { index: usize },
    SetText { index: usize, text: String },
}

/// Editing session over one source document.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    /// Hex SHA-256 of the source bytes.
    fingerprint: String,
    kind: SourceKind,
    status: ExtractionStatus,
    state: LayoutState,
    last_output: Option<OutputDocument>,
}

impl Session {
    /// Extract `bytes` and start a session over the result.
    ///
    /// An empty extraction still yields a session; check [`Session::status`].
    #[instrument(skip(bytes, extractor), fields(bytes_len = bytes.len()))]
    pub fn load(
        bytes: &[u8],
        kind_hint: Option<SourceKind>,
        extractor: &ContentExtractor,
    ) -> Result<Self> {
        let fingerprint = hex::encode(Sha256::digest(bytes));
        let extraction = extractor.extract(bytes, kind_hint)?;

        let mut state = LayoutState::new();
        state.insert_initial(extraction.units)?;

        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            fingerprint,
            kind: extraction.kind,
            status: extraction.status,
            state,
            last_output: None,
        };
        info!(
            session = %session.id,
            fingerprint = %session.fingerprint,
            units = session.state.len(),
            "Session loaded"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn status(&self) -> ExtractionStatus {
        self.status
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    /// The most recent successful export, if any.
    pub fn last_output(&self) -> Option<&OutputDocument> {
        self.last_output.as_ref()
    }

    /// Apply one editor gesture. Deleting returns the removed unit.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn apply(&mut self, gesture: Gesture) -> Result<Option<Unit>> {
        match gesture {
            Gesture::MoveUp { index } => self.state.move_up(index),
            Gesture::MoveDown { index } => self.state.move_down(index),
            Gesture::Delete { index } => return self.state.delete(index).map(Some),
            Gesture::SetText { index, text } => self.state.set_text(index, text)?,
        }
        Ok(None)
    }

    /// Compose the current layout. The layout is snapshotted first and never
    /// changed by an export; the retained output is replaced only on success.
    #[instrument(skip(self, compositor, writer), fields(session = %self.id, %policy))]
    pub fn export(
        &mut self,
        compositor: &Compositor,
        spec: &BleedSpec,
        policy: PlacementPolicy,
        writer: &mut dyn OutputWriter,
    ) -> Result<&OutputDocument> {
        let snapshot = self.state.snapshot();
        match compositor.compose(snapshot, spec, policy, writer) {
            Ok(document) => Ok(self.last_output.insert(document)),
            Err(err) => {
                warn!(%err, "Export failed; previous output kept");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::TextStyle;
    use crate::compose::tests::{RecordingWriter, png};
    use crate::image::RasterPassthrough;
    use crate::reader::SourceReader;
    use trimpress_core::config::ExportConfig;
    use trimpress_core::error::TrimpressError;
    use trimpress_core::geometry::compute_bleed_spec;
    use trimpress_core::types::TrimSize;

    fn extractor() -> ContentExtractor {
        let config = ExportConfig::default();
        ContentExtractor::new(
            SourceReader::new(),
            RasterPassthrough::new(config.max_page_pixels),
            &config,
        )
    }

    fn spec() -> BleedSpec {
        compute_bleed_spec(TrimSize::new(6.0, 9.0), true).unwrap()
    }

    fn compositor() -> Compositor {
        Compositor::new(TextStyle::default(), "session test")
    }

    fn text_session() -> Session {
        Session::load(b"one\n\ntwo\n\nthree", None, &extractor()).unwrap()
    }

    fn contents(session: &Session) -> Vec<String> {
        session
            .state()
            .iter()
            .map(|unit| match unit {
                Unit::Text { content, .. } => content.clone(),
                Unit::Image { .. } => "<image>".into(),
            })
            .collect()
    }

    #[test]
    fn load_fingerprints_and_populates() {
        let session = text_session();
        assert_eq!(session.fingerprint().len(), 64);
        assert_eq!(session.kind(), SourceKind::Flowable);
        assert_eq!(session.status(), ExtractionStatus::Populated(3));
        assert_eq!(contents(&session), vec!["one", "two", "three"]);
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(text_session().id(), text_session().id());
    }

    #[test]
    fn gestures_edit_the_layout() {
        let mut session = text_session();
        session.apply(Gesture::MoveDown { index: 0 }).unwrap();
        session
            .apply(Gesture::SetText {
                index: 2,
                text: "THREE".into(),
            })
            .unwrap();
        let removed = session.apply(Gesture::Delete { index: 1 }).unwrap();
        assert_eq!(removed.map(|u| u.source_index()), Some(0));
        assert_eq!(contents(&session), vec!["two", "THREE"]);
    }

    #[test]
    fn failed_export_keeps_previous_output_and_layout() {
        let mut session = Session::load(&png(20, 10), None, &extractor()).unwrap();
        let mut writer = RecordingWriter::default();
        session
            .export(&compositor(), &spec(), PlacementPolicy::FillToBleed, &mut writer)
            .unwrap();
        let first = session.last_output().cloned();

        let mut failing = RecordingWriter {
            fail_on_image: true,
            ..RecordingWriter::default()
        };
        assert!(
            session
                .export(&compositor(), &spec(), PlacementPolicy::FillToBleed, &mut failing)
                .is_err()
        );
        assert_eq!(session.last_output().cloned(), first);
        assert_eq!(session.state().len(), 1);
    }

    #[test]
    fn empty_source_loads_but_cannot_export() {
        let mut session = Session::load(b"   \n\n  ", None, &extractor()).unwrap();
        assert_eq!(session.status(), ExtractionStatus::Empty);
        let mut writer = RecordingWriter::default();
        assert!(matches!(
            session.export(&compositor(), &spec(), PlacementPolicy::ShrinkToSafeZone, &mut writer),
            Err(TrimpressError::EmptyDocument)
        ));
        assert!(session.last_output().is_none());
    }

    #[test]
    fn gesture_round_trips_through_json() {
        let gesture: Gesture = serde_json::from_str(r#"{"op":"set_text","index":3,"text":"Hi"}"#).unwrap();
        assert_eq!(
            gesture,
            Gesture::SetText {
                index: 3,
                text: "Hi".into()
            }
        );
    }
}
