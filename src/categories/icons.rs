/// Fixed local icon registry. Category rows store a bare icon identifier;
/// anything we do not ship resolves to the default.
pub const DEFAULT_ICON: &str = "tag";

const KNOWN_ICONS: &[&str] = &[
    "home",
    "tv",
    "smartphone",
    "car",
    "sofa",
    "shirt",
    "briefcase",
    "wrench",
    "book",
    "gamepad",
    "tag",
];

pub fn resolve(icon: &str) -> &'static str {
    KNOWN_ICONS
        .iter()
        .find(|known| **known == icon)
        .copied()
        .unwrap_or(DEFAULT_ICON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_icons_pass_through() {
        assert_eq!(resolve("home"), "home");
        assert_eq!(resolve("car"), "car");
    }

    #[test]
    fn unknown_icons_fall_back_to_default() {
        assert_eq!(resolve("spaceship"), DEFAULT_ICON);
        assert_eq!(resolve(""), DEFAULT_ICON);
    }
}
