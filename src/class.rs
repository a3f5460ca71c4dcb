use serde::Serialize;

/// Sort order given to any class label missing from the alias table.
pub const UNKNOWN_CLASS_ORDER: i32 = 99;

// (raw label, display name, sort order). Legacy car-class ids share the
// descriptor of their modern label.
const CLASS_ALIASES: &[(&str, &str, i32)] = &[
    ("Hypercar", "Hypercar", 1),
    ("P2", "P2", 2),
    ("GT3", "GT3", 3),
    ("Class 4074", "Hypercar", 1),
    ("Class 2523", "P2", 2),
    ("Class 2708", "GT3", 3),
];

const CLASS_ICONS: &[(&str, &str)] = &[("Hypercar", "🟥"), ("P2", "🟦"), ("GT3", "🟩")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDescriptor {
    pub raw_key: String,
    pub display_name: String,
    pub sort_order: i32,
}

impl ClassDescriptor {
    pub fn icon(&self) -> Option<&'static str> {
        class_icon(&self.display_name)
    }
}

pub fn resolve_class(raw: &str) -> ClassDescriptor {
    match CLASS_ALIASES.iter().find(|(key, _, _)| *key == raw) {
        Some((_, display, order)) => ClassDescriptor {
            raw_key: raw.to_string(),
            display_name: (*display).to_string(),
            sort_order: *order,
        },
        None => ClassDescriptor {
            raw_key: raw.to_string(),
            display_name: raw.to_string(),
            sort_order: UNKNOWN_CLASS_ORDER,
        },
    }
}

pub fn class_icon(display_name: &str) -> Option<&'static str> {
    CLASS_ICONS
        .iter()
        .find(|(name, _)| *name == display_name)
        .map(|(_, icon)| *icon)
}
