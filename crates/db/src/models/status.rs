//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order
//! (1-based) in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Client lifecycle status. Only active clients are swept.
    ClientStatus {
        Active = 1,
        Archived = 2,
    }
}

define_status_enum! {
    /// Durable queue job status.
    QueueJobStatus {
        /// Waiting for its `run_at` to pass, or re-queued for retry.
        Pending = 1,
        /// Leased by a worker; redelivered if the lease expires.
        Running = 2,
        /// Acknowledged after successful execution. Terminal.
        Completed = 3,
        /// Exhausted its attempts or failed permanently. Terminal;
        /// held for operator inspection, never dropped.
        DeadLetter = 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_status_ids_match_seed_data() {
        assert_eq!(ClientStatus::Active.id(), 1);
        assert_eq!(ClientStatus::Archived.id(), 2);
    }

    #[test]
    fn queue_job_status_ids_match_seed_data() {
        assert_eq!(QueueJobStatus::Pending.id(), 1);
        assert_eq!(QueueJobStatus::Running.id(), 2);
        assert_eq!(QueueJobStatus::Completed.id(), 3);
        assert_eq!(QueueJobStatus::DeadLetter.id(), 4);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = QueueJobStatus::DeadLetter.into();
        assert_eq!(id, 4);
    }
}
