use super::*;

/// Hands out job ids. Starts at `0xcccc` so the first id is `0xcccd`, and
/// wraps back to 1 when the counter reaches a multiple of `0xffffffffff`.
#[derive(Debug, Clone)]
pub struct JobCounter {
    counter: u64,
}

impl JobCounter {
    pub const INITIAL: u64 = 0xcccc;
    pub const WRAP: u64 = 0xff_ffff_ffff;

    pub fn new() -> Self {
        Self {
            counter: Self::INITIAL,
        }
    }

    pub fn next(&mut self) -> JobId {
        self.counter += 1;

        if self.counter % Self::WRAP == 0 {
            self.counter = 1;
        }

        self.cur()
    }

    pub fn cur(&self) -> JobId {
        JobId::new(self.counter)
    }
}

impl Default for JobCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out per-connection extranonces. Values are random, so two
/// connections may collide; the nonce range check only needs each value to be
/// stable for its own connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtranonceCounter;

impl ExtranonceCounter {
    pub fn next(&self) -> Extranonce {
        Extranonce::generate()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn first_id_follows_initial_value() {
        let mut counter = JobCounter::new();
        assert_eq!(counter.cur(), JobId::new(0xcccc));
        assert_eq!(counter.next(), JobId::new(0xcccd));
        assert_eq!(counter.cur(), JobId::new(0xcccd));
        assert_eq!(counter.next(), JobId::new(0xccce));
    }

    #[test]
    fn cur_renders_as_64_hex_chars() {
        let mut counter = JobCounter::new();
        let id = counter.next().to_string();
        assert_eq!(id.len(), 64);
        assert!(id.ends_with("000000000000cccd"));
        assert!(id[..48].bytes().all(|c| c == b'0'));
    }

    #[test]
    fn wraps_to_one() {
        let mut counter = JobCounter {
            counter: JobCounter::WRAP - 1,
        };
        assert_eq!(counter.next(), JobId::new(1));
        assert_eq!(counter.next(), JobId::new(2));
    }

    #[test]
    fn ids_are_unique_until_wrap() {
        let mut counter = JobCounter::new();
        let ids = (0..1000)
            .map(|_| counter.next())
            .collect::<HashSet<JobId>>();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn extranonce_is_six_hex_chars() {
        let extranonce = ExtranonceCounter.next();
        assert_eq!(extranonce.len(), Extranonce::SIZE);
        assert_eq!(extranonce.to_string().len(), 6);
        assert!(is_hex_string(&extranonce.to_string()));
    }
}
