//! Playback/queue state: what is playing, what comes next, what is liked.
//!
//! Every operation is an in-memory transition that cannot fail. The only
//! side effect is the liked store write inside [`PlaybackQueue::toggle_like`].

use std::collections::VecDeque;

use super::cache::LikedSongsCache;
use super::track::Track;

#[derive(Debug)]
pub struct PlaybackQueue {
    current: Option<Track>,
    is_playing: bool,
    queue: VecDeque<Track>,
    liked: LikedSongsCache,
}

impl PlaybackQueue {
    pub fn new(liked: LikedSongsCache) -> Self {
        Self {
            current: None,
            is_playing: false,
            queue: VecDeque::new(),
            liked,
        }
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// Only ever true while a current track exists
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn queue(&self) -> &VecDeque<Track> {
        &self.queue
    }

    /// Accepts any track, including one whose source cannot be resolved;
    /// that failure belongs to the playback surface.
    pub fn play_track(&mut self, track: Track) {
        tracing::debug!(track_id = %track.id, title = %track.title, "Playing track");
        self.current = Some(track);
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn resume(&mut self) {
        if self.current.is_some() {
            self.is_playing = true;
        }
    }

    /// Play the head of the queue. Returns false, leaving the current track
    /// and playing flag untouched, when the queue is empty.
    pub fn advance(&mut self) -> bool {
        match self.queue.pop_front() {
            Some(next) => {
                self.play_track(next);
                true
            }
            None => false,
        }
    }

    /// Plays the *last* queued track when more than one is queued.
    ///
    /// There is no play history, so this is not "go back to what just
    /// played". The entry stays in the queue.
    pub fn retreat(&mut self) -> bool {
        if self.queue.len() > 1 {
            if let Some(last) = self.queue.back().cloned() {
                self.play_track(last);
                return true;
            }
        }
        false
    }

    pub fn enqueue(&mut self, track: Track) {
        self.queue.push_back(track);
    }

    pub fn remove_from_queue(&mut self, index: usize) -> Option<Track> {
        self.queue.remove(index)
    }

    /// Flip the liked state of `track.id`. Returns the new state.
    pub fn toggle_like(&mut self, track: &Track) -> bool {
        self.liked.toggle(track)
    }

    pub fn is_liked(&self, track_id: &str) -> bool {
        self.liked.is_liked(track_id)
    }

    pub fn liked_tracks(&self) -> &[Track] {
        self.liked.tracks()
    }
}
