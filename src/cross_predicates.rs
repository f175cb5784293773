//! Row rules of the cross-number puzzle.
//!
//! Every maximal run of unshaded cells in a row reads as a number, and the
//! row's rule decides which numbers are acceptable. A rule may also narrow
//! the digits allowed anywhere in its row (a digit product of 25 only
//! admits 1 and 5).

use std::fmt;

/// A set of the digits 1 to 9, bit `d` for digit `d`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DigitSet(u16);

impl DigitSet {
    pub const NONZERO: DigitSet = DigitSet(0b11_1111_1110);
    pub const EMPTY: DigitSet = DigitSet(0);

    pub const fn contains(self, digit: u8) -> bool {
        digit < 10 && self.0 & (1 << digit) != 0
    }

    pub const fn with(self, digit: u8) -> DigitSet {
        if digit == 0 || digit > 9 {
            return self;
        }
        DigitSet(self.0 | (1 << digit))
    }

    pub const fn intersect(self, other: DigitSet) -> DigitSet {
        DigitSet(self.0 & other.0)
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Digits in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (1..=9).filter(move |&digit| self.contains(digit))
    }
}

impl FromIterator<u8> for DigitSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        iter.into_iter().fold(DigitSet::EMPTY, DigitSet::with)
    }
}

impl fmt::Display for DigitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, digit) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{digit}")?;
        }
        write!(f, "}}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowPredicate {
    PerfectSquare,
    /// The digits multiply to exactly this value.
    DigitProduct(u64),
    MultipleOf(u64),
    /// Divisible by each of its own digits.
    DivisibleByDigits,
    /// A palindrome that starts and ends with an odd digit.
    OddPalindrome,
    Fibonacci,
    Prime,
}

impl RowPredicate {
    /// Digits that may appear in a number of this row.
    pub fn allowed_digits(&self) -> DigitSet {
        let RowPredicate::DigitProduct(product) = *self else {
            return DigitSet::NONZERO;
        };

        let mut exponents = [0u32; 8];
        let mut rest = product;
        for prime in [2u64, 3, 5, 7] {
            while rest != 0 && rest % prime == 0 {
                exponents[prime as usize] += 1;
                rest /= prime;
            }
        }
        let [_, _, twos, threes, _, fives, _, sevens] = exponents;

        [
            (1, true),
            (2, twos >= 1),
            (3, threes >= 1),
            (4, twos >= 2),
            (5, fives >= 1),
            (6, twos >= 1 && threes >= 1),
            (7, sevens >= 1),
            (8, twos >= 3),
            (9, threes >= 2),
        ]
        .into_iter()
        .filter(|&(_, allowed)| allowed)
        .map(|(digit, _)| digit)
        .collect()
    }

    /// Reads `digits` as a number and checks it against the rule. Entries
    /// need at least two digits, all of them allowed in the row.
    pub fn evaluate(&self, digits: &[u8]) -> Option<u64> {
        if digits.len() < 2 {
            return None;
        }
        let allowed = self.allowed_digits();
        if !digits.iter().all(|&digit| allowed.contains(digit)) {
            return None;
        }

        let value = digits
            .iter()
            .try_fold(0u64, |acc, &digit| acc.checked_mul(10)?.checked_add(u64::from(digit)))?;

        self.holds(value, digits).then_some(value)
    }

    fn holds(&self, value: u64, digits: &[u8]) -> bool {
        match *self {
            RowPredicate::PerfectSquare => is_perfect_square(value),
            RowPredicate::DigitProduct(product) => {
                digits
                    .iter()
                    .try_fold(1u64, |acc, &digit| acc.checked_mul(u64::from(digit)))
                    == Some(product)
            }
            RowPredicate::MultipleOf(divisor) => divisor != 0 && value % divisor == 0,
            RowPredicate::DivisibleByDigits => digits
                .iter()
                .all(|&digit| digit != 0 && value % u64::from(digit) == 0),
            RowPredicate::OddPalindrome => {
                let first_odd = digits.first().is_some_and(|d| d & 1 == 1);
                let last_odd = digits.last().is_some_and(|d| d & 1 == 1);
                first_odd && last_odd && digits.iter().eq(digits.iter().rev())
            }
            RowPredicate::Fibonacci => is_fibonacci(value),
            RowPredicate::Prime => is_prime(value),
        }
    }
}

impl fmt::Display for RowPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowPredicate::PerfectSquare => write!(f, "square"),
            RowPredicate::DigitProduct(product) => write!(f, "product of digits is {product}"),
            RowPredicate::MultipleOf(divisor) => write!(f, "multiple of {divisor}"),
            RowPredicate::DivisibleByDigits => write!(f, "divisible by each of its digits"),
            RowPredicate::OddPalindrome => write!(f, "odd palindrome"),
            RowPredicate::Fibonacci => write!(f, "fibonacci"),
            RowPredicate::Prime => write!(f, "prime"),
        }
    }
}

fn is_perfect_square(value: u64) -> bool {
    // the float estimate is off by at most one for u64 inputs
    let estimate = (value as f64).sqrt() as u64;
    (estimate.saturating_sub(1)..=estimate + 1).any(|root| root.checked_mul(root) == Some(value))
}

fn is_fibonacci(value: u64) -> bool {
    let (mut a, mut b) = (0u64, 1u64);
    loop {
        if a >= value {
            return a == value;
        }
        match a.checked_add(b) {
            Some(next) => (a, b) = (b, next),
            // b is the largest fibonacci number a u64 holds
            None => return b == value,
        }
    }
}

fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    (u128::from(a) * u128::from(b) % u128::from(modulus)) as u64
}

fn pow_mod(base: u64, mut exp: u64, modulus: u64) -> u64 {
    let mut result = 1;
    let mut base = base % modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exp >>= 1;
    }
    result
}

/// Deterministic Miller-Rabin; the first twelve primes as witnesses cover
/// every `u64`.
fn is_prime(value: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

    if value < 2 {
        return false;
    }
    for p in WITNESSES {
        if value % p == 0 {
            return value == p;
        }
    }

    let mut d = value - 1;
    let mut r = 0;
    while d & 1 == 0 {
        d >>= 1;
        r += 1;
    }

    'witness: for a in WITNESSES {
        let mut x = pow_mod(a, d, value);
        if x == 1 || x == value - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul_mod(x, x, value);
            if x == value - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}
