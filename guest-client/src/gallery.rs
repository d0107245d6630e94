//! Photo sets shown on the page. Each grid opens the lightbox with its own set.

pub const WEDDING_IMAGES: &[&str] = &[
    "select_1.webp",
    "select_2.webp",
    "select_3.webp",
    "select_4.webp",
    "select_5.webp",
];

pub const BEHIND_IMAGES: &[&str] = &[
    "select_56.webp",
    "select_57.webp",
    "select_58.webp",
    "select_59.webp",
    "select_60.webp",
    "select_61.webp",
    "select_62.webp",
    "select_63.webp",
    "select_64.webp",
    "select_65.webp",
];

fn under(dir: &str, files: &[&str]) -> Vec<String> {
    files
        .iter()
        .map(|file| format!("/images/{}/{}", dir, file))
        .collect()
}

/// The main gallery grid.
pub fn wedding_photos() -> Vec<String> {
    under("wedding_select", WEDDING_IMAGES)
}

/// The behind-the-scenes preview strip.
pub fn behind_photos() -> Vec<String> {
    under("behind_select", BEHIND_IMAGES)
}
