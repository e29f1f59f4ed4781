//! Block ids read and written by the carvers, and functions to query their material.

pub mod material;


/// Internal macro to easily define blocks registry.
macro_rules! blocks {
    (
        $($ident:ident / $id:literal : $name:literal),* $(,)?
    ) => {

        static NAMES: [&'static str; 256] = {
            let mut arr = [""; 256];
            $(arr[$id as usize] = $name;)*
            arr
        };

        $(pub const $ident: u8 = $id;)*

    };
}

blocks! {
    AIR/0:              "air",
    STONE/1:            "stone",
    GRASS/2:            "grass",
    DIRT/3:             "dirt",
    COBBLESTONE/4:      "cobblestone",
    BEDROCK/7:          "bedrock",
    WATER_MOVING/8:     "water_moving",
    WATER_STILL/9:      "water_still",
    LAVA_MOVING/10:     "lava_moving",
    LAVA_STILL/11:      "lava_still",
    SAND/12:            "sand",
    GRAVEL/13:          "gravel",
    GOLD_ORE/14:        "gold_ore",
    IRON_ORE/15:        "iron_ore",
    COAL_ORE/16:        "coal_ore",
    LOG/17:             "log",
    LEAVES/18:          "leaves",
    GLASS/20:           "glass",
    LAPIS_ORE/21:       "lapis_ore",
    SANDSTONE/24:       "sandstone",
    WOOL/35:            "wool",
    DIAMOND_ORE/56:     "diamond_ore",
    REDSTONE_ORE/73:    "redstone_ore",
    REDSTONE_ORE_LIT/74: "redstone_ore_lit",
    SNOW/78:            "snow",
    ICE/79:             "ice",
    CLAY/82:            "clay",
}

/// Find a block name from its id, empty for ids unknown to the carvers.
#[inline]
pub const fn name(id: u8) -> &'static str {
    NAMES[id as usize]
}

/// Find a block id from its name.
pub fn from_name(name: &str) -> Option<u8> {
    if name.is_empty() {
        return None;
    }
    NAMES.iter()
        .position(|&n| n == name)
        .map(|n| n as u8)
}
