//! Digit/letter substitution cipher applied to every save payload.

/// The fixed digit/letter substitution table used by the game client.
///
/// This table is part of the reverse-engineered wire format and must never
/// change.
pub const TRANSLATE_KEY: [(char, char); 10] = [
    ('0', 'm'),
    ('1', 'y'),
    ('2', 'w'),
    ('3', 'c'),
    ('4', 'q'),
    ('5', 'a'),
    ('6', 'p'),
    ('7', 'r'),
    ('8', 'e'),
    ('9', 'o'),
];

/// Enciphers a payload: digits become letters, everything else passes
/// through unchanged.
#[must_use]
pub fn encipher(payload: &str) -> String {
    payload
        .chars()
        .map(|c| match c {
            '0' => 'm',
            '1' => 'y',
            '2' => 'w',
            '3' => 'c',
            '4' => 'q',
            '5' => 'a',
            '6' => 'p',
            '7' => 'r',
            '8' => 'e',
            '9' => 'o',
            other => other,
        })
        .collect()
}

/// Deciphers a payload: the ten table letters become digits, everything
/// else passes through unchanged.
#[must_use]
pub fn decipher(payload: &str) -> String {
    payload
        .chars()
        .map(|c| match c {
            'm' => '0',
            'y' => '1',
            'w' => '2',
            'c' => '3',
            'q' => '4',
            'a' => '5',
            'p' => '6',
            'r' => '7',
            'e' => '8',
            'o' => '9',
            other => other,
        })
        .collect()
}
