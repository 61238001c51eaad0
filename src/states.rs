use std::collections::HashMap;

use crate::domain::EntityState;

/// Read access to the host's current entity states.
pub trait StateLookup {
    fn state(&self, entity_id: &str) -> Option<&EntityState>;
}

impl StateLookup for HashMap<String, EntityState> {
    fn state(&self, entity_id: &str) -> Option<&EntityState> {
        self.get(entity_id)
    }
}

/// Entity states keyed by entity id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStates {
    states: HashMap<String, EntityState>,
}

impl EntityStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a state under its own `entity_id`, replacing any earlier one.
    pub fn insert(&mut self, state: EntityState) {
        self.states.insert(state.entity_id.clone(), state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateLookup for EntityStates {
    fn state(&self, entity_id: &str) -> Option<&EntityState> {
        self.states.get(entity_id)
    }
}

impl FromIterator<EntityState> for EntityStates {
    fn from_iter<I: IntoIterator<Item = EntityState>>(iter: I) -> Self {
        let mut states = Self::new();
        for state in iter {
            states.insert(state);
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityStates, StateLookup};
    use crate::domain::EntityState;

    #[test]
    fn reads_host_state_list() {
        let raw = r#"[
            {"entity_id": "sensor.tv1", "state": "on",
             "attributes": {"friendly_name": "TV One", "today": {"08:00": {"title": "A"}}}},
            {"entity_id": "sensor.tv2", "state": "off", "attributes": {"today": null}}
        ]"#;
        let states = serde_json::from_str::<Vec<EntityState>>(raw)
            .expect("valid states")
            .into_iter()
            .collect::<EntityStates>();

        assert_eq!(states.len(), 2);
        let tv1 = states.state("sensor.tv1").expect("tv1 present");
        assert_eq!(tv1.state.as_deref(), Some("on"));
        let today = tv1.attributes.today.as_ref().expect("schedule present");
        assert_eq!(today["08:00"].title, "A");
        assert_eq!(today["08:00"].desc, "");
        assert!(states.state("sensor.tv2").expect("tv2 present").attributes.today.is_none());
        assert!(states.state("sensor.missing").is_none());
    }

    #[test]
    fn later_state_replaces_earlier() {
        let mut states = EntityStates::new();
        let mut first = EntityState::default();
        first.entity_id = "sensor.tv1".to_string();
        first.state = Some("on".to_string());
        let mut second = first.clone();
        second.state = Some("off".to_string());

        states.insert(first);
        states.insert(second);
        assert_eq!(states.len(), 1);
        assert_eq!(states.state("sensor.tv1").and_then(|state| state.state.as_deref()), Some("off"));
    }
}
