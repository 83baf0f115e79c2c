use crate::entities::{PostId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Unliked,
    Liked,
    PendingLike,
    PendingUnlike,
}

impl LikeState {
    pub fn settled(liked: bool) -> Self {
        match liked {
            true => LikeState::Liked,
            false => LikeState::Unliked,
        }
    }

    /// The flag shown to the viewer, pending or not.
    pub fn is_liked(self) -> bool { matches!(self, LikeState::Liked | LikeState::PendingLike) }

    pub fn is_pending(self) -> bool {
        matches!(self, LikeState::PendingLike | LikeState::PendingUnlike)
    }

    pub fn toggled(self) -> Self {
        match self.is_liked() {
            true => LikeState::PendingUnlike,
            false => LikeState::PendingLike,
        }
    }

    pub fn settle(self) -> Self { LikeState::settled(self.is_liked()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub liked: bool,
    pub count: usize,
}

impl LikeSnapshot {
    pub fn flipped(self) -> Self {
        match self.liked {
            true => LikeSnapshot {
                liked: false,
                count: self.count.saturating_sub(1),
            },
            false => LikeSnapshot {
                liked: true,
                count: self.count + 1,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationIntent {
    pub post_id: PostId,
    pub viewer: UserId,
    pub seq: u64,
    pub before: LikeSnapshot,
    pub after: LikeSnapshot,
}

/// What a view renders for one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeView {
    pub state: LikeState,
    pub count: usize,
}

impl LikeView {
    pub fn is_liked(&self) -> bool { self.state.is_liked() }

    pub fn snapshot(&self) -> LikeSnapshot {
        LikeSnapshot {
            liked: self.is_liked(),
            count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_walks_the_four_states() {
        assert_eq!(LikeState::Unliked.toggled(), LikeState::PendingLike);
        assert_eq!(LikeState::Liked.toggled(), LikeState::PendingUnlike);
        assert_eq!(LikeState::PendingLike.toggled(), LikeState::PendingUnlike);
        assert_eq!(LikeState::PendingUnlike.toggled(), LikeState::PendingLike);

        assert_eq!(LikeState::PendingLike.settle(), LikeState::Liked);
        assert_eq!(LikeState::PendingUnlike.settle(), LikeState::Unliked);
        assert_eq!(LikeState::Liked.settle(), LikeState::Liked);
    }

    #[test]
    fn flipping_never_underflows() {
        let s = LikeSnapshot {
            liked: true,
            count: 0,
        };
        assert_eq!(s.flipped().count, 0);
        assert_eq!(s.flipped().flipped(), LikeSnapshot { liked: true, count: 1 });
    }
}
