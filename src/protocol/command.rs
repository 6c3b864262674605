//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Set,
    Get,
    Delete,
    Expire,
    Ttl,
    Begin,
    Commit,
    Rollback,
    Sort,
    List,
}

impl CommandType {
    /// Upper-case verb as written on the wire
    pub fn verb(&self) -> &'static str {
        match self {
            CommandType::Set => "SET",
            CommandType::Get => "GET",
            CommandType::Delete => "DELETE",
            CommandType::Expire => "EXPIRE",
            CommandType::Ttl => "TTL",
            CommandType::Begin => "BEGIN",
            CommandType::Commit => "COMMIT",
            CommandType::Rollback => "ROLLBACK",
            CommandType::Sort => "SORT",
            CommandType::List => "LIST",
        }
    }

    /// Look up a verb, ignoring case
    pub fn from_verb(verb: &str) -> Option<Self> {
        let ty = match verb.to_ascii_uppercase().as_str() {
            "SET" => CommandType::Set,
            "GET" => CommandType::Get,
            "DELETE" => CommandType::Delete,
            "EXPIRE" => CommandType::Expire,
            "TTL" => CommandType::Ttl,
            "BEGIN" => CommandType::Begin,
            "COMMIT" => CommandType::Commit,
            "ROLLBACK" => CommandType::Rollback,
            "SORT" => CommandType::Sort,
            "LIST" => CommandType::List,
            _ => return None,
        };
        Some(ty)
    }

    /// Exact argument count after the verb, if the command checks it
    pub fn arity(&self) -> Option<usize> {
        match self {
            CommandType::Set | CommandType::Expire => Some(2),
            CommandType::Get | CommandType::Delete | CommandType::Ttl => Some(1),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a value (clears TTL)
    Set { key: String, value: String },

    /// Get a value by key
    Get { key: String },

    /// Delete a key
    Delete { key: String },

    /// Expire a key after `seconds` (may be negative)
    Expire { key: String, seconds: i64 },

    /// Remaining lifetime of a key
    Ttl { key: String },

    /// Start the store-wide transaction
    Begin,

    /// Apply staged operations
    Commit,

    /// Discard staged operations
    Rollback,

    /// Dump entries ordered by value
    Sort,

    /// Dump entries
    List,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Set { .. } => CommandType::Set,
            Command::Get { .. } => CommandType::Get,
            Command::Delete { .. } => CommandType::Delete,
            Command::Expire { .. } => CommandType::Expire,
            Command::Ttl { .. } => CommandType::Ttl,
            Command::Begin => CommandType::Begin,
            Command::Commit => CommandType::Commit,
            Command::Rollback => CommandType::Rollback,
            Command::Sort => CommandType::Sort,
            Command::List => CommandType::List,
        }
    }
}
