//! 도메인 식별자.
//!
//! 저장소에 커밋된 id와 아직 커밋되지 않은 임시 id를 하나의 불투명 타입으로 다룬다.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// 임시 id 발급 카운터 (프로세스 전역)
static NEXT_DOMAIN_ID: AtomicU64 = AtomicU64::new(1);

/// 시나리오/이벤트/조건/액션 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Identifier {
    /// 외부 저장소에 커밋된 id
    Database(i64),
    /// 커밋 전 임시 id (try 세션, 편집 중 요소)
    Domain(u64),
}

impl Identifier {
    /// 새 임시 id 발급
    pub fn new_domain() -> Self {
        Self::Domain(NEXT_DOMAIN_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 커밋 여부
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// 커밋 완료 후 저장소 id로 교체
    pub fn commit(self, database_id: i64) -> Self {
        match self {
            Self::Database(_) => self,
            Self::Domain(_) => Self::Database(database_id),
        }
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self::Database(value)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(id) => write!(f, "db:{id}"),
            Self::Domain(id) => write!(f, "tmp:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_ids_are_unique() {
        let a = Identifier::new_domain();
        let b = Identifier::new_domain();
        assert_ne!(a, b);
        assert!(!a.is_committed());
    }

    #[test]
    fn commit_replaces_only_pending_ids() {
        let pending = Identifier::new_domain();
        assert_eq!(pending.commit(42), Identifier::Database(42));

        let committed = Identifier::Database(7);
        assert_eq!(committed.commit(42), Identifier::Database(7));
    }

    #[test]
    fn database_and_domain_never_collide() {
        assert_ne!(Identifier::Database(1), Identifier::Domain(1));
    }
}
