// 32-bit Mersenne Twister (Matsumoto & Nishimura), keyed through
// init_by_array and drawn at 53-bit resolution.

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

#[derive(Debug, Clone)]
pub struct Mt19937 {
    state: [u32; N],
    index: usize,
}

impl Mt19937 {
    pub fn new(seed: u32) -> Self {
        let mut state = [0u32; N];
        state[0] = seed;
        for i in 1..N {
            let prev = state[i - 1];
            state[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Mt19937 { state, index: N }
    }

    /// Seeds from an arbitrary-length key (`init_by_array`).
    pub fn from_key(key: &[u32]) -> Self {
        let key = if key.is_empty() { &[0][..] } else { key };
        let mut mt = Mt19937::new(19_650_218);
        let s = &mut mt.state;

        let mut i = 1;
        let mut j = 0;
        for _ in 0..N.max(key.len()) {
            let prev = s[i - 1];
            s[i] = (s[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_664_525))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                s[0] = s[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = s[i - 1];
            s[i] = (s[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_566_083_941))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                s[0] = s[N - 1];
                i = 1;
            }
        }

        // non-zero initial state is guaranteed
        s[0] = 0x8000_0000;
        mt
    }

    pub fn next_u32(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }

        let mut y = self.state[self.index];
        self.index += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^ (y >> 18)
    }

    /// Uniform float in `[0, 1)` built from two draws (27 + 26 bits).
    pub fn next_f64(&mut self) -> f64 {
        let a = self.next_u32() >> 5;
        let b = self.next_u32() >> 6;
        (a as f64 * 67_108_864.0 + b as f64) * (1.0 / 9_007_199_254_740_992.0)
    }

    fn twist(&mut self) {
        for kk in 0..N {
            let y = (self.state[kk] & UPPER_MASK) | (self.state[(kk + 1) % N] & LOWER_MASK);
            let mag = if y & 1 != 0 { MATRIX_A } else { 0 };
            self.state[kk] = self.state[(kk + M) % N] ^ (y >> 1) ^ mag;
        }
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(key: &[u32], n: usize) -> Vec<f64> {
        let mut mt = Mt19937::from_key(key);
        (0..n).map(|_| mt.next_f64()).collect()
    }

    #[test]
    fn test_reference_values() {
        assert_eq!(
            draws(&[101], 3),
            vec![0.5811521325045647, 0.1947544955341367, 0.9652511070611112]
        );
        assert_eq!(
            draws(&[0], 2),
            vec![0.8444218515250481, 0.7579544029403025]
        );
    }

    #[test]
    fn test_two_word_key() {
        // 2^40 + 7
        assert_eq!(
            draws(&[7, 256], 2),
            vec![0.6137037779936511, 0.8149162973309487]
        );
    }

    #[test]
    fn test_values_across_state_regeneration() {
        // each f64 consumes two words, so index 312 onward crosses the first twist
        let values = draws(&[7], 1000);
        assert_eq!(values[623], 0.33820310050331803);
        assert_eq!(values[624], 0.06205951793600539);
        assert_eq!(values[999], 0.37786262968738116);
    }

    #[test]
    fn test_empty_key_behaves_like_zero() {
        assert_eq!(draws(&[], 4), draws(&[0], 4));
    }

    #[test]
    fn test_unit_interval() {
        let mut mt = Mt19937::new(5489);
        for _ in 0..10_000 {
            let x = mt.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
