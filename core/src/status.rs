//! Elements, status channels and synergy identifiers.

use serde::{Deserialize, Serialize};

/// RGB colour used by presentation layers for floating numbers and tints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Damage element carried by gems and the effects they spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Plain kinetic damage with no status.
    Physical,
    /// Applies [`StatusKind::Burn`].
    Fire,
    /// Applies [`StatusKind::Freeze`] through an area burst.
    Ice,
    /// Applies [`StatusKind::Leech`].
    Plant,
    /// Applies [`StatusKind::Soaked`].
    Water,
    /// Applies [`StatusKind::Shock`].
    Electric,
    /// Applies [`StatusKind::Confusion`].
    Psychic,
    /// Applies [`StatusKind::Poison`].
    Poison,
}

impl Element {
    /// Status channel the element applies on hit, if any.
    #[must_use]
    pub const fn status(self) -> Option<StatusKind> {
        match self {
            Self::Physical => None,
            Self::Fire => Some(StatusKind::Burn),
            Self::Ice => Some(StatusKind::Freeze),
            Self::Plant => Some(StatusKind::Leech),
            Self::Water => Some(StatusKind::Soaked),
            Self::Electric => Some(StatusKind::Shock),
            Self::Psychic => Some(StatusKind::Confusion),
            Self::Poison => Some(StatusKind::Poison),
        }
    }

    /// Tint used for floating damage numbers.
    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            Self::Physical => Rgb::from_rgb(0xf0, 0xf0, 0xf0),
            Self::Fire => Rgb::from_rgb(0xff, 0x6a, 0x1f),
            Self::Ice => Rgb::from_rgb(0x8c, 0xe0, 0xff),
            Self::Plant => Rgb::from_rgb(0x4c, 0xc2, 0x3a),
            Self::Water => Rgb::from_rgb(0x2f, 0x7b, 0xff),
            Self::Electric => Rgb::from_rgb(0xff, 0xe1, 0x3b),
            Self::Psychic => Rgb::from_rgb(0xd0, 0x5c, 0xff),
            Self::Poison => Rgb::from_rgb(0x8e, 0xd1, 0x2c),
        }
    }
}

/// Independent per-enemy status channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    /// Periodic fire damage.
    Burn,
    /// Halts movement and knockback.
    Freeze,
    /// Stacking periodic damage.
    Poison,
    /// Amplifies incoming damage.
    Shock,
    /// Halves movement speed.
    Soaked,
    /// Turns common enemies against their neighbours.
    Confusion,
    /// Briefly halts movement and attacks.
    Stun,
    /// Drains the enemy to heal the base.
    Leech,
}

impl StatusKind {
    /// Every status channel in declaration order.
    pub const ALL: [StatusKind; 8] = [
        StatusKind::Burn,
        StatusKind::Freeze,
        StatusKind::Poison,
        StatusKind::Shock,
        StatusKind::Soaked,
        StatusKind::Confusion,
        StatusKind::Stun,
        StatusKind::Leech,
    ];

    /// Reports whether the channel counts toward elemental vulnerability.
    #[must_use]
    pub const fn is_elemental(self) -> bool {
        matches!(
            self,
            Self::Burn | Self::Freeze | Self::Poison | Self::Shock | Self::Soaked
        )
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Compact set of active status channels exposed through snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatusSet(u16);

impl StatusSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Adds a channel to the set.
    pub fn insert(&mut self, kind: StatusKind) {
        self.0 |= kind.bit();
    }

    /// Reports whether the channel is present.
    #[must_use]
    pub const fn contains(&self, kind: StatusKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Number of channels present.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    /// Reports whether no channel is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the present channels in declaration order.
    pub fn iter(self) -> impl Iterator<Item = StatusKind> {
        StatusKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<StatusKind> for StatusSet {
    fn from_iter<I: IntoIterator<Item = StatusKind>>(iter: I) -> Self {
        let mut set = Self::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// Reactions triggered when two statuses coexist on one enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynergyKind {
    /// Burn and soaked flash into a scalding burst.
    Steam,
    /// Burn ignites accumulated poison.
    ToxicDetonation,
    /// Shock arcs through water to nearby enemies.
    Electrocute,
    /// Burn and freeze tear the enemy apart.
    Meltdown,
    /// Burn and shock release a knockback pulse.
    Overload,
    /// Freeze and shock shatter the enemy into shards.
    Superconduct,
    /// Poison and soaked leave a corrosive pool.
    Corrosion,
    /// Shock carries poison to neighbours.
    PoisonSpread,
    /// Freeze deepens in water and crushes the enemy.
    Crush,
    /// Confusion and burn leave a burning zone.
    Inferno,
    /// Confusion and poison leave a toxic cloud.
    Miasma,
    /// Confusion and shock leave a static field.
    Storm,
    /// Confusion and freeze leave a frost field.
    Permafrost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_set_tracks_membership() {
        let mut set = StatusSet::empty();
        assert!(set.is_empty());
        set.insert(StatusKind::Burn);
        set.insert(StatusKind::Leech);
        set.insert(StatusKind::Burn);
        assert_eq!(set.len(), 2);
        assert!(set.contains(StatusKind::Leech));
        assert!(!set.contains(StatusKind::Freeze));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![StatusKind::Burn, StatusKind::Leech]
        );
    }

    #[test]
    fn every_elemental_gem_maps_to_a_distinct_status() {
        let elements = [
            Element::Fire,
            Element::Ice,
            Element::Plant,
            Element::Water,
            Element::Electric,
            Element::Psychic,
            Element::Poison,
        ];
        let set: StatusSet = elements.iter().filter_map(|e| e.status()).collect();
        assert_eq!(set.len(), 7);
        assert_eq!(Element::Physical.status(), None);
    }
}
