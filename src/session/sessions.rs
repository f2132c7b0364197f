//! The weekend's session list (practice, qualifying, race).

use serde::{Deserialize, Serialize};

use super::results::{ResultsFastestLap, ResultsPosition};

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionList {
    pub current_session_num: Option<i32>,
    pub sessions: Vec<Session>,
}

impl SessionList {
    /// The session the writer reports as running.
    pub fn current(&self) -> Option<&Session> {
        let num = self.current_session_num?;
        self.session(num)
    }

    pub fn session(&self, session_num: i32) -> Option<&Session> {
        self.sessions.iter().find(|session| session.session_num == session_num)
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Session {
    pub session_num: i32,
    /// `unlimited` or a lap count.
    pub session_laps: String,
    /// `unlimited` or a duration such as `600.0000 sec`.
    pub session_time: String,
    pub session_num_laps_to_avg: Option<i32>,
    pub session_type: String,
    pub session_track_rubber_state: Option<String>,
    pub session_name: Option<String>,
    pub session_sub_type: Option<String>,
    pub session_skipped: Option<i32>,
    pub session_run_groups_used: Option<i32>,
    pub session_enforce_tire_compound_change: Option<i32>,
    /// `None` until the session has produced an order.
    pub results_positions: Option<Vec<ResultsPosition>>,
    pub results_fastest_lap: Option<Vec<ResultsFastestLap>>,
    pub results_average_lap_time: Option<f64>,
    pub results_num_caution_flags: Option<i32>,
    pub results_num_caution_laps: Option<i32>,
    pub results_num_lead_changes: Option<i32>,
    pub results_laps_complete: Option<i32>,
    pub results_official: Option<i32>,
}

impl Session {
    /// Lap limit, or `None` for unlimited or timed sessions.
    pub fn lap_limit(&self) -> Option<u32> {
        self.session_laps.trim().parse().ok()
    }

    /// Time limit in seconds, or `None` for unlimited sessions.
    pub fn time_limit_secs(&self) -> Option<f64> {
        self.session_time.trim().strip_suffix("sec")?.trim().parse().ok()
    }

    pub fn is_race(&self) -> bool {
        self.session_type.eq_ignore_ascii_case("race")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_parse_from_display_text() {
        let session = Session {
            session_laps: "unlimited".into(),
            session_time: "600.0000 sec".into(),
            ..Session::default()
        };
        assert_eq!(session.lap_limit(), None);
        assert_eq!(session.time_limit_secs(), Some(600.0));

        let race = Session { session_laps: "20".into(), session_time: "unlimited".into(), ..session };
        assert_eq!(race.lap_limit(), Some(20));
        assert_eq!(race.time_limit_secs(), None);
    }

    #[test]
    fn current_session_follows_marker() {
        let list = SessionList {
            current_session_num: Some(2),
            sessions: (0..3)
                .map(|session_num| Session { session_num, ..Session::default() })
                .collect(),
        };
        assert_eq!(list.current().map(|s| s.session_num), Some(2));
        assert!(SessionList::default().current().is_none());
    }
}
