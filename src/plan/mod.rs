pub mod selector;

use crate::api::{Direction, PlanRow, PlanUpsert, WorkspaceKey};

pub const ACTIVITIES: &[&str] = &[
    "Coffee",
    "Movie",
    "Board games",
    "Nature walk",
    "Study",
    "Do nothing together",
    "Play a sport",
    "Stay in 😈",
];

pub const VIBES: &[&str] = &[
    "Cozy",
    "Adventurous",
    "Lazy",
    "Romantic",
    "Chaotic and Energetic",
    "😈",
];

pub const FOODS: &[&str] = &[
    "Pizza",
    "Thai",
    "Chicken Sandwich",
    "Wings",
    "Bagels",
    "Sushi",
    "Snacks",
    "Pasta",
    "Indian",
    "Chinese",
    "Healthy",
    "You 😈",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub activities: Vec<String>,
    pub vibe: String,
    pub foods: Vec<String>,
    pub locked: bool,
}

impl Plan {
    pub fn from_row(row: PlanRow) -> Self {
        Self {
            activities: row.activity.map(|a| a.into_vec()).unwrap_or_default(),
            vibe: row.vibe.unwrap_or_default(),
            foods: row.food.map(|f| f.into_vec()).unwrap_or_default(),
            locked: row.locked.unwrap_or(false),
        }
    }

    pub fn can_lock(&self) -> bool {
        !self.activities.is_empty() && !self.vibe.is_empty() && !self.foods.is_empty()
    }

    pub fn to_upsert(&self, workspace: &WorkspaceKey, direction: Direction) -> PlanUpsert {
        PlanUpsert {
            profile_key: workspace.clone(),
            direction,
            activity: self.activities.clone(),
            vibe: if self.vibe.is_empty() { None } else { Some(self.vibe.clone()) },
            food: self.foods.clone(),
            locked: self.locked,
        }
    }
}

/// One field edit coming out of the planner UI
#[derive(Debug, Clone, PartialEq)]
pub enum PlanEdit {
    Activities(Vec<String>),
    Vibe(String),
    Foods(Vec<String>),
    Lock,
}

/// Both directions' plans for the workspace
#[derive(Debug, Clone, Default)]
pub struct Plans {
    outbound: Plan,
    inbound: Plan,
}

impl Plans {
    pub fn get(&self, direction: Direction) -> &Plan {
        match direction {
            Direction::NyuToIu => &self.outbound,
            Direction::IuToNyu => &self.inbound,
        }
    }

    fn get_mut(&mut self, direction: Direction) -> &mut Plan {
        match direction {
            Direction::NyuToIu => &mut self.outbound,
            Direction::IuToNyu => &mut self.inbound,
        }
    }

    /// Take whatever the backend has; directions without a row stay as they are
    pub fn apply_rows(&mut self, rows: Vec<PlanRow>) {
        for row in rows {
            let direction = row.direction;
            *self.get_mut(direction) = Plan::from_row(row);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply an edit and return the row to upsert, or None when nothing
    /// changed (locking an incomplete or already locked plan).
    pub fn apply(
        &mut self,
        workspace: &WorkspaceKey,
        direction: Direction,
        edit: PlanEdit,
    ) -> Option<PlanUpsert> {
        let plan = self.get_mut(direction);
        match edit {
            PlanEdit::Activities(values) => plan.activities = values,
            PlanEdit::Vibe(value) => plan.vibe = value,
            PlanEdit::Foods(values) => plan.foods = values,
            PlanEdit::Lock => {
                if plan.locked || !plan.can_lock() {
                    return None;
                }
                plan.locked = true;
            }
        }
        Some(plan.to_upsert(workspace, direction))
    }
}
