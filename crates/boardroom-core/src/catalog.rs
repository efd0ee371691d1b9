//! The fixed 27-entry board every game is seeded with.

use contracts::Property;

type CatalogRow = (&'static str, &'static str, i64, &'static [i64]);

const BOARD: &[CatalogRow] = &[
    ("Mediterranean Avenue", "Brown", 60, &[2, 10, 30, 90, 160, 250]),
    ("Baltic Avenue", "Brown", 60, &[4, 20, 60, 180, 320, 450]),
    ("Oriental Avenue", "Light Blue", 100, &[6, 30, 90, 270, 400, 550]),
    ("Vermont Avenue", "Light Blue", 100, &[6, 30, 90, 270, 400, 550]),
    ("Connecticut Avenue", "Light Blue", 120, &[8, 40, 100, 300, 450, 600]),
    ("St. Charles Place", "Pink", 140, &[10, 50, 150, 450, 625, 750]),
    ("Electric Company", "Utility", 150, &[4, 10]),
    ("States Avenue", "Pink", 140, &[10, 50, 150, 450, 625, 750]),
    ("Virginia Avenue", "Pink", 160, &[12, 60, 180, 500, 700, 900]),
    ("Pennsylvania Railroad", "Railroad", 200, &[25, 50, 100, 200]),
    ("St. James Place", "Orange", 180, &[14, 70, 200, 550, 750, 950]),
    ("Tennessee Avenue", "Orange", 180, &[14, 70, 200, 550, 750, 950]),
    ("New York Avenue", "Orange", 200, &[16, 80, 220, 600, 800, 1000]),
    ("Kentucky Avenue", "Red", 220, &[18, 90, 250, 700, 875, 1050]),
    ("Indiana Avenue", "Red", 220, &[18, 90, 250, 700, 875, 1050]),
    ("Illinois Avenue", "Red", 240, &[20, 100, 300, 750, 925, 1100]),
    ("B. & O. Railroad", "Railroad", 200, &[25, 50, 100, 200]),
    ("Atlantic Avenue", "Yellow", 260, &[22, 110, 330, 800, 975, 1150]),
    ("Ventnor Avenue", "Yellow", 260, &[22, 110, 330, 800, 975, 1150]),
    ("Water Works", "Utility", 150, &[4, 10]),
    ("Marvin Gardens", "Yellow", 280, &[24, 120, 360, 850, 1025, 1200]),
    ("Pacific Avenue", "Green", 300, &[26, 130, 390, 900, 1100, 1275]),
    ("North Carolina Avenue", "Green", 300, &[26, 130, 390, 900, 1100, 1275]),
    ("Pennsylvania Avenue", "Green", 320, &[28, 150, 450, 1000, 1200, 1400]),
    ("Short Line", "Railroad", 200, &[25, 50, 100, 200]),
    ("Park Place", "Dark Blue", 350, &[35, 175, 500, 1100, 1300, 1500]),
    ("Boardwalk", "Dark Blue", 400, &[50, 200, 600, 1400, 1700, 2000]),
];

/// Stable slug id for a catalog name, e.g. "B. & O. Railroad" ->
/// "prop_b_o_railroad".
pub fn slug_id(name: &str) -> String {
    let mut slug = String::from("prop");
    let mut last_was_separator = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if last_was_separator {
                slug.push('_');
            }
            slug.push(ch.to_ascii_lowercase());
            last_was_separator = false;
        } else {
            last_was_separator = true;
        }
    }
    slug
}

pub fn standard_board() -> Vec<Property> {
    BOARD
        .iter()
        .map(|(name, color, price, rent)| Property {
            id: slug_id(name),
            name: (*name).to_string(),
            color: (*color).to_string(),
            price: *price,
            rent: rent.to_vec(),
            owner_id: None,
            owner_name: None,
            houses: 0,
            available: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_has_unique_ids_and_open_ownership() {
        let board = standard_board();
        let ids = board
            .iter()
            .map(|property| property.id.clone())
            .collect::<std::collections::BTreeSet<_>>();
        assert_eq!(ids.len(), board.len());
        assert!(board
            .iter()
            .all(|property| property.available && property.owner_id.is_none()));
    }

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug_id("B. & O. Railroad"), "prop_b_o_railroad");
        assert_eq!(slug_id("St. Charles Place"), "prop_st_charles_place");
    }
}
