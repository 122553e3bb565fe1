//! Permission bitflags.
//!
//! Permissions are a 64-bit bitfield shared between guild roles and channel
//! overwrites. The bit layout is fixed by the wire protocol, so bits are
//! never renumbered; retired bits are left unassigned.
//!
//! Rough grouping:
//! - General (bits 0-7): invites, moderation, administration
//! - Channel text (bits 10-18): visibility, messaging, attachments
//! - Voice (bits 20-25): connect, speak, voice moderation
//! - Management (bits 26-34): nicknames, roles, webhooks, events
//! - Threads & extras (bits 35-46): threads, activities, voice messages

use bitflags::bitflags;

bitflags! {
    /// Guild and channel permissions represented as a 64-bit bitfield.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct Permissions: u64 {
        // === General (bits 0-9) ===
        /// Permission to create invite links
        const CREATE_INSTANT_INVITE = 1 << 0;
        /// Permission to kick members from the guild
        const KICK_MEMBERS          = 1 << 1;
        /// Permission to ban members from the guild
        const BAN_MEMBERS           = 1 << 2;
        /// Implies every other permission and bypasses channel overwrites
        const ADMINISTRATOR         = 1 << 3;
        /// Permission to create, edit, reorder, and delete channels
        const MANAGE_CHANNELS       = 1 << 4;
        /// Permission to modify guild settings
        const MANAGE_GUILD          = 1 << 5;
        /// Permission to add reactions to messages
        const ADD_REACTIONS         = 1 << 6;
        /// Permission to view the guild audit log
        const VIEW_AUDIT_LOG        = 1 << 7;
        /// Permission to be heard over others in voice channels
        const PRIORITY_SPEAKER      = 1 << 8;
        /// Permission to stream video in voice channels
        const STREAM                = 1 << 9;

        // === Channel text (bits 10-18) ===
        /// Permission to view a channel; gates every other channel permission
        const READ_MESSAGES         = 1 << 10;
        /// Permission to send messages in text channels
        const SEND_MESSAGES         = 1 << 11;
        /// Permission to send text-to-speech messages
        const SEND_TTS_MESSAGES     = 1 << 12;
        /// Permission to delete or pin messages from other members
        const MANAGE_MESSAGES       = 1 << 13;
        /// Permission to embed links in messages (auto-preview)
        const EMBED_LINKS           = 1 << 14;
        /// Permission to attach files to messages
        const ATTACH_FILES          = 1 << 15;
        /// Permission to read a channel's message history
        const READ_MESSAGE_HISTORY  = 1 << 16;
        /// Permission to mention @everyone and @here
        const MENTION_EVERYONE      = 1 << 17;
        /// Permission to use emoji from other guilds
        const USE_EXTERNAL_EMOJIS   = 1 << 18;

        // === Voice (bits 20-25) ===
        /// Permission to connect to voice channels
        const CONNECT               = 1 << 20;
        /// Permission to speak in voice channels
        const SPEAK                 = 1 << 21;
        /// Permission to mute other members in voice channels
        const MUTE_MEMBERS          = 1 << 22;
        /// Permission to deafen other members in voice channels
        const DEAFEN_MEMBERS        = 1 << 23;
        /// Permission to move members between voice channels
        const MOVE_MEMBERS          = 1 << 24;
        /// Permission to use voice activation instead of push-to-talk
        const USE_VOICE_ACTIVATION  = 1 << 25;

        // === Management (bits 26-34) ===
        /// Permission to change one's own nickname
        const CHANGE_NICKNAME       = 1 << 26;
        /// Permission to change other members' nicknames
        const MANAGE_NICKNAMES      = 1 << 27;
        /// Permission to create, edit, and delete roles and overwrites
        const MANAGE_ROLES          = 1 << 28;
        /// Permission to manage webhooks
        const MANAGE_WEBHOOKS       = 1 << 29;
        /// Permission to manage custom emoji and stickers
        const MANAGE_EXPRESSIONS    = 1 << 30;
        /// Permission to use application (slash) commands
        const USE_APPLICATION_COMMANDS = 1 << 31;
        /// Permission to request to speak in stage channels
        const REQUEST_TO_SPEAK      = 1 << 32;
        /// Permission to manage scheduled events
        const MANAGE_EVENTS         = 1 << 33;
        /// Permission to manage and delete threads
        const MANAGE_THREADS        = 1 << 34;

        // === Threads & extras (bits 35-46) ===
        /// Permission to create public threads
        const CREATE_PUBLIC_THREADS  = 1 << 35;
        /// Permission to create private threads
        const CREATE_PRIVATE_THREADS = 1 << 36;
        /// Permission to use stickers from other guilds
        const USE_EXTERNAL_STICKERS  = 1 << 37;
        /// Permission to send messages in threads
        const SEND_MESSAGES_IN_THREADS = 1 << 38;
        /// Permission to launch embedded activities
        const USE_EMBEDDED_ACTIVITIES = 1 << 39;
        /// Permission to timeout members (temporary mute)
        const MODERATE_MEMBERS       = 1 << 40;
        /// Permission to use the soundboard in voice channels
        const USE_SOUNDBOARD         = 1 << 42;
        /// Permission to send voice messages
        const SEND_VOICE_MESSAGES    = 1 << 46;
    }
}

impl Permissions {
    // === Preset Combinations ===

    /// Permissions that only make sense at guild scope and are never granted
    /// or revoked by channel overwrites.
    pub const GUILD_ONLY: Self = Self::KICK_MEMBERS
        .union(Self::BAN_MEMBERS)
        .union(Self::ADMINISTRATOR)
        .union(Self::MANAGE_GUILD)
        .union(Self::VIEW_AUDIT_LOG)
        .union(Self::CHANGE_NICKNAME)
        .union(Self::MANAGE_NICKNAMES)
        .union(Self::MANAGE_EXPRESSIONS)
        .union(Self::MODERATE_MEMBERS);

    /// Every channel-scoped permission bit.
    ///
    /// A member who cannot view a channel holds none of these inside it.
    pub const ALL_CHANNEL: Self = Self::all().difference(Self::GUILD_ONLY);

    /// Permissions that depend on being able to send messages.
    ///
    /// Cleared whenever the resolved set lacks [`Self::SEND_MESSAGES`].
    pub const MESSAGE_DEPENDENT: Self = Self::SEND_TTS_MESSAGES
        .union(Self::SEND_VOICE_MESSAGES)
        .union(Self::MENTION_EVERYONE)
        .union(Self::EMBED_LINKS)
        .union(Self::ATTACH_FILES)
        .union(Self::CREATE_PUBLIC_THREADS)
        .union(Self::CREATE_PRIVATE_THREADS)
        .union(Self::USE_APPLICATION_COMMANDS);

    /// Default permissions for the everyone role of a fresh guild.
    pub const EVERYONE_DEFAULT: Self = Self::CREATE_INSTANT_INVITE
        .union(Self::ADD_REACTIONS)
        .union(Self::READ_MESSAGES)
        .union(Self::SEND_MESSAGES)
        .union(Self::EMBED_LINKS)
        .union(Self::ATTACH_FILES)
        .union(Self::READ_MESSAGE_HISTORY)
        .union(Self::USE_EXTERNAL_EMOJIS)
        .union(Self::CONNECT)
        .union(Self::SPEAK)
        .union(Self::USE_VOICE_ACTIVATION)
        .union(Self::CHANGE_NICKNAME)
        .union(Self::USE_APPLICATION_COMMANDS)
        .union(Self::CREATE_PUBLIC_THREADS)
        .union(Self::SEND_MESSAGES_IN_THREADS);

    // === Wire Conversion ===

    /// Create permissions from a raw wire value.
    ///
    /// Unknown bits are silently dropped to stay forward compatible with
    /// newer servers.
    #[must_use]
    pub const fn from_wire(value: u64) -> Self {
        Self::from_bits_truncate(value)
    }

    /// Raw wire value of this permission set.
    #[must_use]
    pub const fn to_wire(self) -> u64 {
        self.bits()
    }

    // === Permission Checking ===

    /// Check if this permission set includes the specified permission(s).
    #[must_use]
    pub const fn has(self, permission: Self) -> bool {
        self.contains(permission)
    }

    /// Apply one overwrite layer: clear the denied bits, then set the
    /// allowed bits.
    ///
    /// Deny is applied first so that an allow in the same layer wins over a
    /// deny of the same bit.
    #[must_use]
    pub const fn apply_overwrite(self, allow: Self, deny: Self) -> Self {
        self.difference(deny).union(allow)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}
