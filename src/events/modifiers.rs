use serde::{Deserialize, Serialize};
use std::fmt;

/// Абстрактная клавиша-модификатор
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    #[serde(alias = "cmd", alias = "super", alias = "meta")]
    Command,
    #[serde(alias = "alt")]
    Option,
    #[serde(alias = "ctrl")]
    Control,
    Shift,
    #[serde(alias = "fn")]
    Function,
}

impl Modifier {
    pub const ALL: [Modifier; 5] = [
        Modifier::Command,
        Modifier::Option,
        Modifier::Control,
        Modifier::Shift,
        Modifier::Function,
    ];

    /// Бит в сыром наборе флагов, соответствующий модификатору
    pub fn flag(self) -> ModifierFlags {
        match self {
            Modifier::Command => ModifierFlags::COMMAND,
            Modifier::Option => ModifierFlags::OPTION,
            Modifier::Control => ModifierFlags::CONTROL,
            Modifier::Shift => ModifierFlags::SHIFT,
            Modifier::Function => ModifierFlags::FUNCTION,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Modifier::Command => "command",
            Modifier::Option => "option",
            Modifier::Control => "control",
            Modifier::Shift => "shift",
            Modifier::Function => "function",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Сырые флаги модификаторов, как их отдаёт источник событий.
///
/// Биты, не соответствующие ни одному [`Modifier`] (например CapsLock),
/// переносятся как есть и игнорируются классификатором.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierFlags(pub u32);

impl ModifierFlags {
    pub const EMPTY: ModifierFlags = ModifierFlags(0);
    #[allow(dead_code)]
    pub const CAPS_LOCK: ModifierFlags = ModifierFlags(1 << 16);
    pub const SHIFT: ModifierFlags = ModifierFlags(1 << 17);
    pub const CONTROL: ModifierFlags = ModifierFlags(1 << 18);
    pub const OPTION: ModifierFlags = ModifierFlags(1 << 19);
    pub const COMMAND: ModifierFlags = ModifierFlags(1 << 20);
    #[allow(dead_code)]
    pub const NUM_LOCK: ModifierFlags = ModifierFlags(1 << 21);
    pub const FUNCTION: ModifierFlags = ModifierFlags(1 << 23);

    pub fn contains(self, other: ModifierFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[allow(dead_code)]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ModifierFlags {
    type Output = ModifierFlags;

    fn bitor(self, rhs: ModifierFlags) -> ModifierFlags {
        ModifierFlags(self.0 | rhs.0)
    }
}

/// Набор абстрактных модификаторов без повторов и без порядка.
///
/// Значение никогда не мутируется на горячем пути: на каждое событие
/// строится новый набор через [`ModifierSet::from_flags`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Modifier>", into = "Vec<Modifier>")]
pub struct ModifierSet(u8);

impl ModifierSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Классификатор: каждый модификатор проверяется независимо,
    /// биты могут сочетаться произвольно.
    pub fn from_flags(flags: ModifierFlags) -> Self {
        Modifier::ALL
            .iter()
            .filter(|modifier| flags.contains(modifier.flag()))
            .copied()
            .collect()
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.0 |= modifier.bit();
        self
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(|m| self.contains(*m))
    }

    /// Сырые флаги, которые классифицируются в этот же набор
    pub fn to_flags(&self) -> ModifierFlags {
        self.iter()
            .fold(ModifierFlags::EMPTY, |flags, modifier| flags | modifier.flag())
    }

    pub fn to_vec(&self) -> Vec<Modifier> {
        self.iter().collect()
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), ModifierSet::with)
    }
}

impl From<Vec<Modifier>> for ModifierSet {
    fn from(modifiers: Vec<Modifier>) -> Self {
        modifiers.into_iter().collect()
    }
}

impl From<ModifierSet> for Vec<Modifier> {
    fn from(set: ModifierSet) -> Self {
        set.to_vec()
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.iter().map(Modifier::name).collect();
        write!(f, "{}", names.join("+"))
    }
}

impl fmt::Debug for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
