/// Decides which cells get tracked.
///
/// Counts calls until the counter reaches `every_n`, then subtracts the
/// threshold instead of resetting it, so the overall rate stays exact even
/// through bursts. A threshold of zero traces nothing.
#[derive(Debug, Clone)]
pub struct Sampler {
    every_n: u32,
    counter: u32,
}

impl Sampler {
    pub fn new(every_n: u32) -> Self {
        Self {
            every_n,
            counter: 0,
        }
    }

    /// Replace the threshold and restart the count, e.g. on config reload.
    pub fn reset(&mut self, every_n: u32) {
        self.every_n = every_n;
        self.counter = 0;
    }

    /// True once out of every `every_n` calls.
    #[inline(always)]
    pub fn hit(&mut self) -> bool {
        if self.every_n == 0 {
            return false;
        }
        self.counter += 1;
        if self.counter >= self.every_n {
            self.counter -= self.every_n;
            true
        } else {
            false
        }
    }

    pub fn every_n(&self) -> u32 {
        self.every_n
    }
}
