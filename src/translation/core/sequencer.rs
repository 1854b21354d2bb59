//! 请求序列器
//!
//! 每个逻辑槽位（检测、翻译、语音转写）维护一个单调递增的代号。每次派发请求都会拿到一张
//! 携带当时代号的 [`Ticket`]；结果返回时只有代号仍是该槽位最新值才会被应用，
//! 否则静默丢弃。网络请求本身不会被取消，只是其结果不再生效。

use std::fmt;

/// 逻辑请求槽位，各槽位互相独立
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Detection,
    Translation,
    Transcription,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Slot::Detection => 0,
            Slot::Translation => 1,
            Slot::Transcription => 2,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Detection => f.write_str("detection"),
            Slot::Translation => f.write_str("translation"),
            Slot::Transcription => f.write_str("transcription"),
        }
    }
}

/// 派发时捕获的代号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub slot: Slot,
    pub generation: u64,
}

/// 请求序列器
#[derive(Debug, Default)]
pub struct RequestSequencer {
    generations: [u64; 3],
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为槽位签发新代号，之前签发的票据全部失效
    pub fn issue(&mut self, slot: Slot) -> Ticket {
        let generation = &mut self.generations[slot.index()];
        *generation += 1;
        Ticket {
            slot,
            generation: *generation,
        }
    }

    /// 使槽位中所有在途请求失效，但不签发新票据
    pub fn invalidate(&mut self, slot: Slot) {
        self.generations[slot.index()] += 1;
    }

    /// 使检测与翻译槽位失效；转写槽位跟随录音生命周期单独管理
    pub fn invalidate_all(&mut self) {
        self.invalidate(Slot::Detection);
        self.invalidate(Slot::Translation);
    }

    pub fn current(&self, slot: Slot) -> u64 {
        self.generations[slot.index()]
    }

    /// 票据是否仍为其槽位的最新代号
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.current(ticket.slot) == ticket.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.issue(Slot::Translation);
        let second = sequencer.issue(Slot::Translation);

        assert!(second.generation > first.generation);
        assert!(!sequencer.is_current(&first));
        assert!(sequencer.is_current(&second));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut sequencer = RequestSequencer::new();
        let detection = sequencer.issue(Slot::Detection);
        let translation = sequencer.issue(Slot::Translation);
        sequencer.issue(Slot::Translation);

        assert!(sequencer.is_current(&detection));
        assert!(!sequencer.is_current(&translation));
    }

    #[test]
    fn test_invalidate_without_issue() {
        let mut sequencer = RequestSequencer::new();
        let detection = sequencer.issue(Slot::Detection);
        let translation = sequencer.issue(Slot::Translation);

        sequencer.invalidate_all();
        assert!(!sequencer.is_current(&detection));
        assert!(!sequencer.is_current(&translation));

        let next = sequencer.issue(Slot::Detection);
        assert_eq!(next.generation, detection.generation + 2);
    }

    #[test]
    fn test_invalidate_all_keeps_transcription() {
        let mut sequencer = RequestSequencer::new();
        let transcription = sequencer.issue(Slot::Transcription);

        sequencer.invalidate_all();
        assert!(sequencer.is_current(&transcription));

        sequencer.invalidate(Slot::Transcription);
        assert!(!sequencer.is_current(&transcription));
    }
}
