//! Merging favorite status into a screen's dish list.
//!
//! Precedence, lowest to highest:
//!
//! 1. the inline `is_favorite` of the endpoint that listed the dish,
//! 2. the bulk `check-favorites` lookup ([`apply_bulk_status`]),
//! 3. local overrides from the [`FavoriteStatusStore`] ([`overlay_overrides`]).

use std::collections::HashMap;

use crate::dish::Dish;
use crate::favorites::FavoriteStatusStore;
use crate::types::DishId;

/// Apply an authoritative bulk favorite lookup.
///
/// Ids missing from `statuses` are reported as not favorited: the
/// lookup covers every id that was asked for. Returns how many dishes
/// changed.
pub fn apply_bulk_status(dishes: &mut [Dish], statuses: &HashMap<DishId, bool>) -> usize {
    let mut changed = 0;
    for dish in dishes.iter_mut() {
        let status = statuses.get(&dish.id).copied().unwrap_or(false);
        if dish.is_favorite != status {
            dish.is_favorite = status;
            changed += 1;
        }
    }
    changed
}

/// Overlay local overrides on top of `dishes`. Returns how many changed.
pub fn overlay_overrides(dishes: &mut [Dish], store: &FavoriteStatusStore) -> usize {
    if store.is_empty() {
        return 0;
    }
    let overrides = store.snapshot();
    let mut changed = 0;
    for dish in dishes.iter_mut() {
        if let Some(&status) = overrides.get(&dish.id) {
            if dish.is_favorite != status {
                dish.is_favorite = status;
                changed += 1;
            }
        }
    }
    changed
}

/// Set `is_favorite` on the dish with `id`. Returns `false` if the list
/// does not contain it.
pub fn set_local_status(dishes: &mut [Dish], id: &DishId, is_favorite: bool) -> bool {
    let mut found = false;
    // A list may legitimately contain the same dish twice (e.g. a
    // trending page that overlaps the previous one).
    for dish in dishes.iter_mut().filter(|d| &d.id == id) {
        dish.is_favorite = is_favorite;
        found = true;
    }
    found
}

/// The ids of `dishes`, deduplicated, in list order.
pub fn dish_ids(dishes: &[Dish]) -> Vec<DishId> {
    let mut seen = std::collections::HashSet::new();
    dishes
        .iter()
        .filter(|d| seen.insert(d.id.clone()))
        .map(|d| d.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dish::Difficulty;

    fn dish(id: &str, is_favorite: bool) -> Dish {
        Dish {
            id: DishId::from(id),
            label: format!("dish {id}"),
            image: String::new(),
            duration: "10 phút".to_string(),
            difficulty: Difficulty::Easy,
            rating: 0.0,
            ingredients: vec![],
            steps: vec![],
            is_favorite,
        }
    }

    #[test]
    fn store_wins_over_bulk_wins_over_inline() {
        let mut dishes = vec![dish("1", false)];
        let bulk = HashMap::from([(DishId::from("1"), true)]);
        let store = FavoriteStatusStore::new();
        store.set_status("1", false);

        apply_bulk_status(&mut dishes, &bulk);
        assert!(dishes[0].is_favorite);

        overlay_overrides(&mut dishes, &store);
        assert!(!dishes[0].is_favorite);
    }

    #[test]
    fn bulk_lookup_marks_missing_ids_unfavorited() {
        let mut dishes = vec![dish("1", true), dish("2", true)];
        let bulk = HashMap::from([(DishId::from("2"), true)]);
        let changed = apply_bulk_status(&mut dishes, &bulk);
        assert_eq!(changed, 1);
        assert!(!dishes[0].is_favorite);
        assert!(dishes[1].is_favorite);
    }

    #[test]
    fn overlay_leaves_dishes_without_override_alone() {
        let mut dishes = vec![dish("1", true), dish("2", false)];
        let store = FavoriteStatusStore::new();
        store.set_status("2", true);

        let changed = overlay_overrides(&mut dishes, &store);
        assert_eq!(changed, 1);
        assert!(dishes[0].is_favorite);
        assert!(dishes[1].is_favorite);
    }

    #[test]
    fn overlay_matches_numeric_store_keys() {
        let mut dishes = vec![dish("42", false)];
        let store = FavoriteStatusStore::new();
        store.set_status(42, true);
        overlay_overrides(&mut dishes, &store);
        assert!(dishes[0].is_favorite);
    }

    #[test]
    fn set_local_status_updates_duplicates_and_reports_missing() {
        let mut dishes = vec![dish("1", false), dish("1", false), dish("2", false)];
        assert!(set_local_status(&mut dishes, &DishId::from("1"), true));
        assert!(dishes[0].is_favorite && dishes[1].is_favorite);
        assert!(!dishes[2].is_favorite);
        assert!(!set_local_status(&mut dishes, &DishId::from("9"), true));
    }

    #[test]
    fn dish_ids_are_deduplicated_in_order() {
        let dishes = vec![dish("b", false), dish("a", false), dish("b", false)];
        assert_eq!(dish_ids(&dishes), vec![DishId::from("b"), DishId::from("a")]);
    }
}
