use aicook_core::Dish;

const HEART_ON: &str = "♥";
const HEART_OFF: &str = "♡";

pub(crate) fn heart(is_favorite: bool) -> &'static str {
    if is_favorite {
        HEART_ON
    } else {
        HEART_OFF
    }
}

/// One table row per dish: heart, id, label, duration, difficulty, rating.
pub(crate) fn dish_row(dish: &Dish) -> String {
    let duration = if dish.duration.is_empty() {
        "-"
    } else {
        dish.duration.as_str()
    };
    format!(
        "{} {:<8} {:<32} {:<10} {:<10} {:.1}",
        heart(dish.is_favorite),
        dish.id,
        dish.label,
        duration,
        dish.difficulty.display_label(),
        dish.rating,
    )
}
