use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::auth::model::SessionUser;

/// Map controls the renderer may show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MapWidget {
    Search,
    Legend,
    Locate,
    Compass,
    HazardFilter,
    LayerList,
    Editor,
    AddHazard,
}

impl MapWidget {
    /// Widgets available to `user` (`None` when signed out), in display order
    pub fn available_for(user: Option<&SessionUser>) -> Vec<MapWidget> {
        let mut widgets = vec![
            MapWidget::Search,
            MapWidget::Legend,
            MapWidget::Locate,
            MapWidget::Compass,
            MapWidget::HazardFilter,
        ];

        if let Some(user) = user {
            widgets.push(MapWidget::LayerList);
            if user.can_edit_features() {
                widgets.push(MapWidget::Editor);
            }
            if user.can_report_hazards() {
                widgets.push(MapWidget::AddHazard);
            }
        }

        widgets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;

    fn user(role: Role) -> SessionUser {
        SessionUser {
            id: "uid-1".to_string(),
            username: "river_watch".to_string(),
            email: None,
            role,
        }
    }

    #[test]
    fn test_anonymous_widgets() {
        let widgets = MapWidget::available_for(None);
        assert!(widgets.contains(&MapWidget::HazardFilter));
        assert!(!widgets.contains(&MapWidget::LayerList));
        assert!(!widgets.contains(&MapWidget::AddHazard));
    }

    #[test]
    fn test_role_gated_widgets() {
        let plain = MapWidget::available_for(Some(&user(Role::User)));
        assert!(plain.contains(&MapWidget::LayerList));
        assert!(plain.contains(&MapWidget::AddHazard));
        assert!(!plain.contains(&MapWidget::Editor));

        let special = MapWidget::available_for(Some(&user(Role::SpecialUser)));
        assert!(special.contains(&MapWidget::Editor));

        let admin = MapWidget::available_for(Some(&user(Role::Admin)));
        assert!(admin.contains(&MapWidget::Editor));
    }
}
