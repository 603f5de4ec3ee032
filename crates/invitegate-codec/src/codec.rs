//! Invite code codec: generate, validate, checksum, format.

use std::collections::HashMap;

use rand::Rng;

use invitegate_core::error::AppError;
use invitegate_core::result::AppResult;

/// Total symbols in a code (7 data symbols + 1 checksum symbol).
const CODE_LEN: usize = 8;

/// Number of data symbols drawn at random.
const DATA_LEN: usize = 7;

/// Index of the checksum symbol in the normalized code.
const CHECKSUM_INDEX: usize = 3;

/// Minimum accepted alphabet size.
const MIN_ALPHABET_LEN: usize = 29;

/// Display separator, inserted after the 4th symbol.
const SEPARATOR: char = '-';

/// Codec for self-checksumming invite codes.
///
/// Deterministic given (alphabet, salt). The salt is a deployment-specific
/// secret: codes minted under one salt fail validation under another, which
/// blocks cross-deployment guessing and replay.
#[derive(Debug, Clone)]
pub struct InviteCodec {
    /// Alphabet symbols in index order.
    alphabet: Vec<char>,
    /// Symbol to alphabet index.
    index: HashMap<char, usize>,
    /// Precomputed sum of the salt's character codes.
    salt_sum: usize,
}

impl InviteCodec {
    /// Create a codec from an alphabet and a checksum salt.
    ///
    /// The alphabet is uppercased and must contain at least 29 distinct
    /// symbols.
    pub fn new(alphabet: &str, salt: &str) -> AppResult<Self> {
        let alphabet: Vec<char> = alphabet.to_uppercase().chars().collect();

        if alphabet.len() < MIN_ALPHABET_LEN {
            return Err(AppError::configuration(format!(
                "Code alphabet must have at least {MIN_ALPHABET_LEN} symbols, got {}",
                alphabet.len()
            )));
        }

        let mut index = HashMap::with_capacity(alphabet.len());
        for (i, &symbol) in alphabet.iter().enumerate() {
            if index.insert(symbol, i).is_some() {
                return Err(AppError::configuration(format!(
                    "Code alphabet contains duplicate symbol '{symbol}'"
                )));
            }
        }

        let salt_sum = salt.chars().map(|c| c as usize).sum();

        Ok(Self {
            alphabet,
            index,
            salt_sum,
        })
    }

    /// Generate a new code, rendered as `XXXX-XXXX`.
    ///
    /// Draws 7 symbols uniformly at random from the alphabet using the
    /// thread-local CSPRNG, computes the checksum symbol over them, and
    /// interleaves it at index 3. Does not block and performs no I/O.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        let data: Vec<char> = (0..DATA_LEN)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect();

        let check = self.checksum(&data);

        let mut raw = String::with_capacity(CODE_LEN);
        raw.extend(&data[..CHECKSUM_INDEX]);
        raw.push(check);
        raw.extend(&data[CHECKSUM_INDEX..]);

        self.format(&raw)
    }

    /// Validate a code: normalize, check length and alphabet membership,
    /// and compare the embedded checksum against a recomputation over the
    /// 7 data symbols in their original relative order.
    ///
    /// Case-insensitive; the separator is optional.
    pub fn validate(&self, raw: &str) -> bool {
        let normalized = self.normalize(raw);
        let symbols: Vec<char> = normalized.chars().collect();

        if symbols.len() != CODE_LEN {
            return false;
        }
        if symbols.iter().any(|s| !self.index.contains_key(s)) {
            return false;
        }

        let mut data = Vec::with_capacity(DATA_LEN);
        data.extend(&symbols[..CHECKSUM_INDEX]);
        data.extend(&symbols[CHECKSUM_INDEX + 1..]);

        self.checksum(&data) == symbols[CHECKSUM_INDEX]
    }

    /// Compute the checksum symbol over 7 data symbols.
    ///
    /// Weighted positional sum: weights alternate 1,2,1,2,... by position,
    /// each symbol contributes `alphabet_index * weight`; the sum of the
    /// salt's character codes is added, and the result is
    /// `alphabet[sum mod B]`.
    ///
    /// Callers must have screened `data` for alphabet membership; only
    /// `generate` and `validate` reach this.
    pub(crate) fn checksum(&self, data: &[char]) -> char {
        debug_assert!(
            data.iter().all(|s| self.index.contains_key(s)),
            "checksum input contains out-of-alphabet symbols"
        );
        let sum: usize = data
            .iter()
            .enumerate()
            .map(|(i, s)| self.index[s] * (1 + i % 2))
            .sum::<usize>()
            + self.salt_sum;

        self.alphabet[sum % self.alphabet.len()]
    }

    /// Strip the separator and uppercase.
    pub fn normalize(&self, raw: &str) -> String {
        raw.trim().replace(SEPARATOR, "").to_uppercase()
    }

    /// Insert the separator after the 4th symbol if the input is exactly
    /// 8 symbols; otherwise return the input unchanged (no silent
    /// truncation). Idempotent.
    pub fn format(&self, raw: &str) -> String {
        let symbols: Vec<char> = raw.chars().collect();
        if symbols.len() != CODE_LEN {
            return raw.to_string();
        }

        let mut display = String::with_capacity(CODE_LEN + 1);
        display.extend(&symbols[..4]);
        display.push(SEPARATOR);
        display.extend(&symbols[4..]);
        display
    }
}
