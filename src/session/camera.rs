//! Broadcast camera groups.

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct CameraInfo {
    pub groups: Vec<Group>,
}

impl CameraInfo {
    pub fn group(&self, group_num: i32) -> Option<&Group> {
        self.groups.iter().find(|group| group.group_num == group_num)
    }
}

/// A named set of cameras the viewer can cycle through.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Group {
    pub group_num: i32,
    pub group_name: String,
    /// Absent in most groups; only scenic groups carry the key.
    pub is_scenic: bool,
    pub cameras: Vec<Camera>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Camera {
    pub camera_num: i32,
    pub camera_name: String,
}
