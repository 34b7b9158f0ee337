//! Static action and tab dependency tables.
//!
//! Selecting a pipeline action determines which configuration tabs the user
//! must visit before running it, and each tab maps to the schema section and
//! field groups it renders. All of this is fixed data; resolution is pure.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How one configuration tab is backed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSpec {
    pub name: &'static str,
    /// Schema section driving this tab; `None` for tabs with local-only
    /// widgets that never touch the session store.
    pub section: Option<&'static str>,
    /// Schema groups rendered on this tab.
    pub groups: &'static [&'static str],
}

/// One action mode shown in the action picker.
#[derive(Debug, Clone, Copy)]
pub struct ActionMode {
    pub name: &'static str,
    pub description: &'static str,
    /// Action label paired with the server-side view name, when the action
    /// maps to a plot view.
    pub actions: &'static [(&'static str, Option<&'static str>)],
}

static TAB_SPECS: &[TabSpec] = &[
    TabSpec {
        name: "Filtering and Cleaning",
        section: Some("filter"),
        groups: &["filter", "channels", "cleaning"],
    },
    TabSpec {
        name: "Time Domain",
        section: None,
        groups: &[],
    },
    TabSpec {
        name: "Epochs",
        section: Some("epochs"),
        groups: &["epochs"],
    },
    TabSpec {
        name: "PSD",
        section: Some("psd"),
        groups: &["psd"],
    },
    TabSpec {
        name: "Evoked Display",
        section: Some("evoked"),
        groups: &["evoked"],
    },
    TabSpec {
        name: "Topomap",
        section: Some("topomap"),
        groups: &["topomap"],
    },
    TabSpec {
        name: "Tables",
        section: None,
        groups: &[],
    },
    TabSpec {
        name: "Models",
        section: None,
        groups: &[],
    },
    TabSpec {
        name: "Training",
        section: None,
        groups: &[],
    },
    TabSpec {
        name: "Prediction",
        section: None,
        groups: &[],
    },
];

// Action label -> ordered required tabs.
static ACTION_TAB_TABLE: &[(&str, &[&str])] = &[
    ("Sensor Layout", &["Filtering and Cleaning"]),
    ("Time Domain Plot", &["Filtering and Cleaning", "Time Domain"]),
    (
        "Frequency Domain",
        &["Filtering and Cleaning", "Epochs", "PSD"],
    ),
    ("Epoch Plot", &["Filtering and Cleaning", "Epochs"]),
    (
        "Evoked Plot",
        &["Filtering and Cleaning", "Epochs", "Evoked Display"],
    ),
    (
        "Evoked Topo Plot",
        &["Filtering and Cleaning", "Evoked Display", "Topomap"],
    ),
    (
        "Evoked Plot Joint",
        &["Filtering and Cleaning", "Epochs", "Topomap", "Evoked Display"],
    ),
    (
        "Evoked per Condition",
        &["Filtering and Cleaning", "Epochs", "Evoked Display"],
    ),
    ("SNR Spectrum", &["Filtering and Cleaning", "Epochs", "PSD"]),
    ("PSD Grid", &["Filtering and Cleaning", "Epochs", "PSD"]),
    ("SNR Grid", &["Filtering and Cleaning", "Epochs", "PSD"]),
    (
        "Evoked Grid",
        &["Filtering and Cleaning", "Epochs", "Evoked Display"],
    ),
    ("EEG Table", &["Filtering and Cleaning", "Tables"]),
    ("Epochs Table", &["Filtering and Cleaning", "Epochs"]),
    ("Metadata", &[]),
    ("Models", &[]),
    (
        "Build Dataset",
        &["Filtering and Cleaning", "Epochs", "Models", "Training"],
    ),
    (
        "Train",
        &["Filtering and Cleaning", "Epochs", "Models", "Training"],
    ),
    (
        "Predict",
        &["Filtering and Cleaning", "Epochs", "Models", "Prediction"],
    ),
];

pub static ACTION_MODES: &[ActionMode] = &[
    ActionMode {
        name: "Plot",
        description: "Produces one concise figure for the current EEG selection.",
        actions: &[
            ("Sensor Layout", Some("sensor_layout")),
            ("Time Domain Plot", Some("time_domain")),
            ("Frequency Domain", Some("frequency_domain")),
            ("Epoch Plot", Some("epoch")),
            ("Evoked Plot", Some("evoked")),
            ("Evoked Topo Plot", Some("evoked_topo")),
            ("Evoked Plot Joint", Some("evoked_joint")),
            ("Evoked per Condition", Some("evoked_per_condition")),
            ("SNR Spectrum", Some("snr_spectrum")),
        ],
    },
    ActionMode {
        name: "Grid Plot",
        description: "Displays per-condition results in a labeled grid for side-by-side comparison.",
        actions: &[
            ("PSD Grid", Some("psd_grid")),
            ("SNR Grid", Some("snr_grid")),
            ("Evoked Grid", Some("evoked_grid")),
        ],
    },
    ActionMode {
        name: "Data",
        description: "Provides structured tables from the current selection.",
        actions: &[
            ("EEG Table", None),
            ("Epochs Table", None),
            ("Metadata", None),
        ],
    },
    ActionMode {
        name: "AI",
        description: "AI training and inference on epochs.",
        actions: &[
            ("Models", None),
            ("Build Dataset", None),
            ("Train", None),
            ("Predict", None),
        ],
    },
];

static ACTION_TABS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| ACTION_TAB_TABLE.iter().copied().collect());

static TABS_BY_NAME: Lazy<HashMap<&'static str, &'static TabSpec>> =
    Lazy::new(|| TAB_SPECS.iter().map(|spec| (spec.name, spec)).collect());

/// Ordered tabs the user must configure before running `action`.
///
/// An unknown action yields an empty list: no configuration surface at all.
pub fn required_tabs(action: &str) -> &'static [&'static str] {
    ACTION_TABS.get(action).copied().unwrap_or(&[])
}

/// The tab active by default when `action` is selected: the head of its
/// requirement list. Reselecting an action re-derives this, it never
/// preserves a previous position.
pub fn default_tab(action: &str) -> Option<&'static str> {
    required_tabs(action).first().copied()
}

pub fn tab_spec(tab: &str) -> Option<&'static TabSpec> {
    TABS_BY_NAME.get(tab).copied()
}

/// The server-side view name a plot action maps to, if any.
pub fn view_name(action: &str) -> Option<&'static str> {
    ACTION_MODES
        .iter()
        .flat_map(|mode| mode.actions.iter())
        .find(|(name, _)| *name == action)
        .and_then(|(_, view)| *view)
}

/// All known action labels, in picker order.
pub fn all_actions() -> impl Iterator<Item = &'static str> {
    ACTION_MODES
        .iter()
        .flat_map(|mode| mode.actions.iter())
        .map(|(name, _)| *name)
}
