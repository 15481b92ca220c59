//! Column metadata and panel definitions.
//!
//! A [`PanelDef`] is the fixed, load-time description of one panel's table:
//! which endpoint it reads, which columns it shows, and which fields can be
//! filtered.  Nothing here changes after the view is mounted.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

// ───────────────────────────────────────── column kinds ──────

/// How a column's values are parsed, displayed, and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    #[serde(alias = "texto")]
    Text,
    #[serde(alias = "data")]
    Date,
    #[serde(alias = "dataHora", alias = "date_time")]
    Datetime,
    Status,
    #[serde(alias = "numero")]
    Number,
}

/// One column of a panel table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnSpec {
    /// Record key this column reads.
    #[serde(alias = "campo")]
    pub field: String,
    /// Header text.
    #[serde(alias = "titulo")]
    pub label: String,
    #[serde(default, alias = "tipo")]
    pub kind: ColumnKind,
    #[serde(default = "default_sortable", alias = "ordenavel")]
    pub sortable: bool,
    /// Preferred width in terminal cells.
    #[serde(default = "default_width")]
    pub width: u16,
}

fn default_sortable() -> bool {
    true
}

fn default_width() -> u16 {
    10
}

impl ColumnSpec {
    pub fn new(field: &str, label: &str, kind: ColumnKind, width: u16) -> Self {
        Self {
            field: field.to_string(),
            label: label.to_string(),
            kind,
            sortable: true,
            width,
        }
    }
}

/// A field the user can constrain to a single value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterSpec {
    /// Record key compared against the selected value.
    pub key: String,
    pub label: String,
}

impl FilterSpec {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

// ───────────────────────────────────────── panels ────────────

/// Everything needed to mount one panel's table view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PanelDef {
    /// Panel id as used in permissions and URLs, e.g. `"painel2"`.
    pub id: String,
    /// Last path segment of the data endpoint, e.g. `"evolucoes"`.
    pub resource: String,
    pub title: String,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

impl PanelDef {
    /// Built-in layout for a panel id, if one ships with the binary.
    pub fn builtin(id: &str) -> Option<Self> {
        match id {
            "painel2" => Some(Self::nursing_evolutions()),
            _ => None,
        }
    }

    /// Load a layout from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading panel layout {}", path.display()))?;
        let def: PanelDef = serde_json::from_str(&raw)
            .with_context(|| format!("parsing panel layout {}", path.display()))?;
        anyhow::ensure!(
            !def.columns.is_empty(),
            "panel layout {} declares no columns",
            path.display()
        );
        Ok(def)
    }

    /// Per-shift evolution status for every inpatient (painel2).
    pub fn nursing_evolutions() -> Self {
        use ColumnKind::*;
        Self {
            id: "painel2".into(),
            resource: "evolucoes".into(),
            title: "Evoluções por turno".into(),
            columns: vec![
                ColumnSpec::new("nr_atendimento", "Atend", Text, 9),
                ColumnSpec::new("nm_paciente", "Paciente", Text, 28),
                ColumnSpec::new("setor", "Setor", Text, 16),
                ColumnSpec::new("unidade", "Unidade", Text, 8),
                ColumnSpec::new("data_turno", "Data", Datetime, 16),
                ColumnSpec::new("turno", "Turno", Text, 8),
                ColumnSpec::new("evol_medico", "Méd", Status, 9),
                ColumnSpec::new("evol_enfermeiro", "Enf", Status, 9),
                ColumnSpec::new("evol_tec_enfermagem", "Téc.Enf.", Status, 9),
                ColumnSpec::new("evol_nutricionista", "Nutri", Status, 9),
                ColumnSpec::new("evol_fisioterapeuta", "Fisio", Status, 9),
            ],
            filters: vec![
                FilterSpec::new("setor", "Setor"),
                FilterSpec::new("turno", "Turno"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_only_knows_table_panels() {
        assert!(PanelDef::builtin("painel2").is_some());
        assert!(PanelDef::builtin("painel10").is_none());
    }

    #[test]
    fn layout_accepts_portuguese_keys_and_kinds() {
        let raw = r#"{
            "id": "painel9",
            "resource": "lista",
            "title": "Lista",
            "columns": [
                {"campo": "nm_paciente", "titulo": "Paciente", "tipo": "texto"},
                {"campo": "dt_entrada", "titulo": "Entrada", "tipo": "dataHora", "ordenavel": false},
                {"field": "idade", "label": "Idade", "kind": "numero", "width": 5}
            ]
        }"#;
        let def: PanelDef = serde_json::from_str(raw).unwrap();
        assert_eq!(def.columns.len(), 3);
        assert_eq!(def.columns[0].kind, ColumnKind::Text);
        assert!(def.columns[0].sortable);
        assert_eq!(def.columns[1].kind, ColumnKind::Datetime);
        assert!(!def.columns[1].sortable);
        assert_eq!(def.columns[2].kind, ColumnKind::Number);
        assert_eq!(def.columns[2].width, 5);
        assert!(def.filters.is_empty());
    }

    #[test]
    fn layout_file_without_columns_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"id":"x","resource":"y","title":"z","columns":[]}"#).unwrap();
        assert!(PanelDef::from_json_file(&path).is_err());
    }
}
