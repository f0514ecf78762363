//! Per-face tile content. Every face carries exactly [`SLOTS_PER_FACE`]
//! entries in slot order (top row left to right, then middle, then bottom).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::face::Face;

pub const SLOTS_PER_FACE: usize = 9;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("reading content table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing content table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown face key '{0}'")]
    UnknownFace(String),
    #[error("face {0} is missing from the content table")]
    MissingFace(Face),
    #[error("face {face} lists {found} entries, expected {SLOTS_PER_FACE}")]
    WrongCardinality { face: Face, found: usize },
}

/// What a single tile shows and, optionally, where activating it leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub icon: String,
    pub title: String,
    #[serde(alias = "short", default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl ContentEntry {
    pub fn new(icon: &str, title: &str, description: &str) -> Self {
        Self {
            icon: icon.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    /// Filler used for faces that have no dedicated content.
    pub fn placeholder() -> Self {
        Self::new("•", "Slot", "")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTable {
    faces: [Vec<ContentEntry>; 6],
}

impl ContentTable {
    /// Validates cardinality for every face before accepting the table.
    pub fn new(mut entries: BTreeMap<Face, Vec<ContentEntry>>) -> Result<Self, ContentError> {
        let mut take = |face: Face| -> Result<Vec<ContentEntry>, ContentError> {
            let list = entries.remove(&face).ok_or(ContentError::MissingFace(face))?;
            if list.len() != SLOTS_PER_FACE {
                return Err(ContentError::WrongCardinality {
                    face,
                    found: list.len(),
                });
            }
            Ok(list)
        };
        Ok(Self {
            faces: [
                take(Face::Tech)?,
                take(Face::Virtues)?,
                take(Face::Up)?,
                take(Face::Down)?,
                take(Face::Product)?,
                take(Face::Contact)?,
            ],
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let raw: BTreeMap<String, Vec<ContentEntry>> = serde_json::from_str(json)?;
        let mut entries = BTreeMap::new();
        for (key, list) in raw {
            let face = Face::from_key(&key).ok_or(ContentError::UnknownFace(key))?;
            entries.insert(face, list);
        }
        Self::new(entries)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ContentError> {
        let json = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&json)?;
        log::debug!("loaded content table from {}", path.display());
        Ok(table)
    }

    pub fn entries(&self, face: Face) -> &[ContentEntry] {
        &self.faces[face.index()]
    }

    pub fn entry(&self, face: Face, slot: usize) -> Option<&ContentEntry> {
        self.entries(face).get(slot)
    }

    pub fn to_json_pretty(&self) -> Result<String, ContentError> {
        let map: BTreeMap<&str, &[ContentEntry]> = Face::ALL
            .into_iter()
            .map(|face| (face.key(), self.entries(face)))
            .collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    /// The table shipped with the page.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            Face::Virtues,
            vec![
                ContentEntry::new("🤝", "Teamwork", "I take ownership and collaborate effectively."),
                ContentEntry::new("🏅", "Ownership", "Drive projects end-to-end to delivery."),
                ContentEntry::new("🧭", "Integrity", "Transparent and ethical decisions."),
                ContentEntry::new("🔥", "Resilience", "Deliver under pressure with quality."),
                ContentEntry::new("🔍", "Curiosity", "Fast learner, loves exploring solutions."),
                ContentEntry::new("🤲", "Empathy", "User & team focused approach."),
                ContentEntry::new("🎯", "Focus", "Prioritize for impact and quality."),
                ContentEntry::new("🧭", "Leadership", "Lead by example, mentor engineers."),
                ContentEntry::new("📈", "Growth", "Continuous skill and product growth."),
            ],
        );
        entries.insert(
            Face::Tech,
            vec![
                ContentEntry::new("JS", "JS / TS", "Modern TypeScript & JS patterns."),
                ContentEntry::new("⚛️", "React / Electron", "Frontend & desktop delivery."),
                ContentEntry::new("⬢", "Node / NestJS", "Robust API design and services."),
                ContentEntry::new("🐍", "Python / FastAPI", "Data & ML endpoints."),
                ContentEntry::new("🗄️", "MySQL / TypeORM", "Relational modeling & migrations."),
                ContentEntry::new("🐳", "Docker", "Container-first deployments."),
                ContentEntry::new("🔀", "Git / GitHub", "CI / PR hygiene & workflows."),
                ContentEntry::new("🎮", "Three.js", "Interactive visual layers."),
                ContentEntry::new("📜", "OpenAPI", "API-first contracts & docs."),
            ],
        );
        entries.insert(
            Face::Product,
            vec![
                ContentEntry::new("📄", "Doc Intelligence", "OCR & visual forensics pipelines."),
                ContentEntry::new("🧠", "Classification", "Templates & classification flows."),
                ContentEntry::new("🤖", "AI Orchestration", "Multi-agent orchestration patterns."),
                ContentEntry::new("⚖️", "Compliance", "Regulatory-aware system design."),
                ContentEntry::new("🌐", "Graph Thinking", "Graph models (Neo4j) for relationships."),
                ContentEntry::new("🔁", "Workflow Design", "Reliable state and workflow engines."),
                ContentEntry::new("🎤", "Voice Assistants", "Conversational UX & assistants."),
                ContentEntry::new("⚙️", "Automation", "Desktop & process automation."),
                ContentEntry::new("✅", "DX / QA", "Developer experience & testing."),
            ],
        );
        entries.insert(
            Face::Contact,
            vec![
                ContentEntry::new("✉️", "Email", "marko.petronijevic@elitas-belgrade.com")
                    .with_action("mailto:marko.petronijevic@elitas-belgrade.com"),
                ContentEntry::new("📞", "Phone", "(+381) 631440708 (Mobile)")
                    .with_action("tel:+381631440708"),
                ContentEntry::new("💬", "WhatsApp", "WhatsApp")
                    .with_action("https://wa.me/381631440708"),
                ContentEntry::new("🔗", "Facebook", "facebook.com")
                    .with_action("https://www.facebook.com/share/16grphStpV/"),
                ContentEntry::new("📄", "Open PDF CV", "Open full CV").with_action("./Marko_P.pdf"),
                ContentEntry::new("🌐", "Portfolio", "Portfolio")
                    .with_action("https://your-portfolio.example"),
                ContentEntry::new("🔒", "QR / Demo", "Scan for demo"),
                ContentEntry::new("➕", "More", "Extra links"),
                ContentEntry::new("📍", "Location", "Belgrade, Serbia"),
            ],
        );
        entries.insert(Face::Up, vec![ContentEntry::placeholder(); SLOTS_PER_FACE]);
        entries.insert(Face::Down, vec![ContentEntry::placeholder(); SLOTS_PER_FACE]);

        match Self::new(entries) {
            Ok(table) => table,
            Err(err) => unreachable!("built-in content table is malformed: {err}"),
        }
    }
}

impl Default for ContentTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_table_has_nine_entries_per_face() {
        let table = ContentTable::builtin();
        for face in Face::ALL {
            assert_eq!(table.entries(face).len(), SLOTS_PER_FACE, "{face}");
        }
        let tech = table.entry(Face::Tech, 4).expect("tech slot 4");
        assert_eq!(tech.title, "MySQL / TypeORM");
        assert_eq!(table.entry(Face::Up, 0), Some(&ContentEntry::placeholder()));
        assert!(table.entry(Face::Tech, 9).is_none());
    }

    #[test]
    fn contact_actions_survive_json_round_trip() {
        let table = ContentTable::builtin();
        let json = table.to_json_pretty().expect("serialize");
        let reloaded = ContentTable::from_json_str(&json).expect("reload");
        assert_eq!(reloaded, table);
        assert_eq!(
            reloaded.entry(Face::Contact, 1).and_then(|e| e.action.as_deref()),
            Some("tel:+381631440708")
        );
    }

    #[test]
    fn short_field_is_accepted_as_description() {
        let entry: ContentEntry =
            serde_json::from_str(r#"{"icon":"🐳","title":"Docker","short":"Containers"}"#)
                .expect("parse entry");
        assert_eq!(entry.description, "Containers");
        assert_eq!(entry.action, None);
    }

    #[test]
    fn rejects_face_with_wrong_entry_count() {
        let mut value: serde_json::Value =
            serde_json::from_str(&ContentTable::builtin().to_json_pretty().unwrap()).unwrap();
        value["TECH"].as_array_mut().unwrap().pop();
        let err = ContentTable::from_json_str(&value.to_string()).unwrap_err();
        assert!(
            matches!(err, ContentError::WrongCardinality { face: Face::Tech, found: 8 }),
            "{err}"
        );
    }

    #[test]
    fn rejects_missing_and_unknown_faces() {
        let mut value: serde_json::Value =
            serde_json::from_str(&ContentTable::builtin().to_json_pretty().unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("DOWN");
        let err = ContentTable::from_json_str(&value.to_string()).unwrap_err();
        assert!(matches!(err, ContentError::MissingFace(Face::Down)), "{err}");

        let err = ContentTable::from_json_str(r#"{"SIDEWAYS": []}"#).unwrap_err();
        assert!(matches!(err, ContentError::UnknownFace(ref key) if key == "SIDEWAYS"));
    }

    #[test]
    fn loads_table_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("content.json");
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(ContentTable::builtin().to_json_pretty().unwrap().as_bytes())
            .expect("write");
        drop(file);

        let table = ContentTable::from_json_file(&path).expect("load");
        assert_eq!(table.entry(Face::Virtues, 0).unwrap().title, "Teamwork");

        let missing = ContentTable::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, ContentError::Io { .. }));
    }
}
