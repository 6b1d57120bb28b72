//! Catalog and image fixtures.

use rebuddy_models::{Catalog, LabelCategory, LabelItem};

/// Leading bytes of a JFIF JPEG file.
pub const JPEG_HEADER: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF";

/// PNG signature.
pub const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n";

/// A small JPEG-looking payload: header followed by zero padding.
#[must_use]
pub fn jpeg_bytes() -> Vec<u8> {
    let mut bytes = JPEG_HEADER.to_vec();
    bytes.extend(std::iter::repeat_n(0_u8, 100));
    bytes
}

/// A small PNG-looking payload: signature followed by zero padding.
#[must_use]
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = PNG_HEADER.to_vec();
    bytes.extend(std::iter::repeat_n(0_u8, 100));
    bytes
}

/// Flat catalog with one item, `bottle` / `Plastic Bottle`.
#[must_use]
pub fn single_item_catalog() -> Catalog {
    Catalog::Flat(vec![LabelItem {
        value: "bottle".into(),
        display_name: "Plastic Bottle".into(),
    }])
}

/// Grouped catalog with three short categories.
#[must_use]
pub fn grouped_catalog() -> Catalog {
    Catalog::Grouped(vec![
        category("Plastic Containers", &["plastic-bottle", "plastic-jug", "yogurt-container"]),
        category("Glass", &["glass-bottle", "glass-jar", "wine-bottle"]),
        category("Metal", &["aluminum-can", "tin-can", "aerosol-can"]),
    ])
}

/// The full household waste catalog, grouped by category.
#[must_use]
pub fn household_catalog() -> Catalog {
    Catalog::Grouped(
        HOUSEHOLD
            .iter()
            .map(|(name, values)| category(name, values))
            .collect(),
    )
}

fn category(name: &str, values: &[&str]) -> LabelCategory {
    LabelCategory {
        category: name.to_string(),
        items: values.iter().copied().map(LabelItem::from_value).collect(),
    }
}

const HOUSEHOLD: &[(&str, &[&str])] = &[
    (
        "Paper and Cardboard",
        &[
            "newspaper",
            "cardboard-box",
            "cereal-box",
            "paper-bag",
            "office-paper",
            "magazine",
            "junk-mail",
            "phone-book",
            "wrapping-paper",
            "paper-towel-roll",
            "egg-carton-paper",
            "paper-plate",
            "notebook",
            "envelope",
            "shredded-paper",
        ],
    ),
    (
        "Plastic Containers",
        &[
            "plastic-bottle",
            "plastic-jug",
            "plastic-tub",
            "plastic-cup",
            "plastic-food-container",
            "yogurt-container",
            "plastic-lid",
            "detergent-bottle",
            "shampoo-bottle",
            "plastic-bucket",
        ],
    ),
    (
        "Plastic Film and Bags",
        &[
            "plastic-bag",
            "plastic-wrap",
            "bubble-wrap",
            "shrink-wrap",
            "zip-lock-bag",
        ],
    ),
    (
        "Glass",
        &[
            "glass-bottle",
            "glass-jar",
            "glass-container",
            "wine-bottle",
            "beer-bottle",
            "glass-cup",
            "broken-glass",
        ],
    ),
    (
        "Metal",
        &[
            "aluminum-can",
            "tin-can",
            "steel-can",
            "aluminum-foil",
            "aluminum-tray",
            "aerosol-can",
            "metal-lid",
            "paint-can",
            "wire-hanger",
            "metal-utensil",
        ],
    ),
    (
        "Food and Yard Waste",
        &[
            "fruit-scraps",
            "vegetable-scraps",
            "coffee-grounds",
            "coffee-filter",
            "tea-bag",
            "eggshell",
            "bread",
            "pasta",
            "rice",
            "nutshell",
            "yard-trimmings",
            "leaves",
            "grass-clippings",
            "flower",
            "houseplant",
        ],
    ),
    (
        "Electronics",
        &[
            "cell-phone",
            "laptop",
            "tablet",
            "computer-monitor",
            "keyboard",
            "mouse",
            "power-cord",
            "charger",
            "headphones",
            "battery",
            "light-bulb-led",
            "light-bulb-fluorescent",
            "light-bulb-incandescent",
        ],
    ),
    (
        "Textiles",
        &[
            "clothing",
            "shoes",
            "towel",
            "bedsheet",
            "curtain",
            "rug",
            "stuffed-animal",
            "backpack",
            "purse",
        ],
    ),
    (
        "Hazardous Waste",
        &[
            "motor-oil",
            "paint",
            "pesticide",
            "cleaning-chemical",
            "prescription-medication",
            "thermometer",
            "smoke-detector",
            "propane-tank",
            "fire-extinguisher",
        ],
    ),
    (
        "Non-Recyclable Household",
        &[
            "styrofoam-container",
            "styrofoam-packing",
            "disposable-diaper",
            "sanitary-product",
            "cotton-swab",
            "dental-floss",
            "rubber-band",
            "pen",
            "marker",
            "crayon",
            "ceramic-mug",
            "ceramic-plate",
            "mirror",
            "window-glass",
            "tissue",
            "paper-napkin",
            "wax-paper",
            "parchment-paper",
            "chip-bag",
            "candy-wrapper",
            "straw",
        ],
    ),
];
