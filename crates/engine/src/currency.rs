use crate::Money;

/// Currency the ledger is kept in.
///
/// The bot is mono-currency (Indonesian rupiah), but rendering rules live here
/// so they never depend on the host locale.
///
/// ## Rendering
///
/// `format` splits the amount at `minor_units()` decimals, groups the integer
/// part by thousands and prefixes the marker:
///
/// ```rust
/// use engine::{Currency, Money};
///
/// assert_eq!(Currency::Idr.format(Money::major(1000)), "Rp1.000,00");
/// assert_eq!(Currency::Idr.format(Money::new(-123_456_00)), "Rp-123.456,00");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Currency {
    #[default]
    Idr,
}

impl Currency {
    /// Marker written before every rendered amount.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Currency::Idr => "Rp",
        }
    }

    #[must_use]
    pub const fn thousands_separator(self) -> char {
        match self {
            Currency::Idr => '.',
        }
    }

    #[must_use]
    pub const fn decimal_separator(self) -> char {
        match self {
            Currency::Idr => ',',
        }
    }

    /// Number of fraction digits used when formatting amounts. Matches the
    /// two decimals a [`Money`] holds.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Idr => 2,
        }
    }

    /// Renders `amount` as `Rp1.234.567,50`.
    ///
    /// A minus sign stays glued to the first digit (`Rp-1.000,00`); grouping
    /// only ever applies to digits.
    #[must_use]
    pub fn format(self, amount: Money) -> String {
        let minor = amount.minor();
        let digits = usize::from(self.minor_units());
        let scale = 10_u64.pow(u32::from(self.minor_units()));
        let abs = minor.unsigned_abs();
        let units = (abs / scale).to_string();
        let fraction = abs % scale;

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (idx, digit) in units.chars().enumerate() {
            if idx != 0 && (units.len() - idx) % 3 == 0 {
                grouped.push(self.thousands_separator());
            }
            grouped.push(digit);
        }

        let sign = if minor < 0 { "-" } else { "" };
        format!(
            "{marker}{sign}{grouped}{sep}{fraction:0digits$}",
            marker = self.marker(),
            sep = self.decimal_separator(),
        )
    }
}
