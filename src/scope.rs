use std::fmt::Display;

/// Authorization scopes spotview asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    UserReadPrivate,
    UserReadEmail,
    UserTopRead,
    UserReadCurrentlyPlaying,
    UserReadPlaybackState,
    UserModifyPlaybackState,
    UserFollowRead,
}

pub const DEFAULT_SCOPES: [Scope; 7] = [
    Scope::UserReadPrivate,
    Scope::UserReadEmail,
    Scope::UserTopRead,
    Scope::UserReadCurrentlyPlaying,
    Scope::UserReadPlaybackState,
    Scope::UserModifyPlaybackState,
    Scope::UserFollowRead,
];

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::UserReadPrivate => write!(f, "user-read-private"),
            Scope::UserReadEmail => write!(f, "user-read-email"),
            Scope::UserTopRead => write!(f, "user-top-read"),
            Scope::UserReadCurrentlyPlaying => write!(f, "user-read-currently-playing"),
            Scope::UserReadPlaybackState => write!(f, "user-read-playback-state"),
            Scope::UserModifyPlaybackState => write!(f, "user-modify-playback-state"),
            Scope::UserFollowRead => write!(f, "user-follow-read"),
        }
    }
}

pub trait ToScopesString
where
    Self: IntoIterator<Item = Scope>,
{
    fn to_scopes_string(self) -> String;
}

impl<I> ToScopesString for I
where
    I: IntoIterator<Item = Scope>,
{
    fn to_scopes_string(self) -> String {
        self.into_iter()
            .map(|scope| scope.to_string())
            .collect::<Vec<String>>()
            .join(" ")
    }
}
