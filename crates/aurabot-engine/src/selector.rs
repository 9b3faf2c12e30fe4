use aurabot_db::AuraStore;
use aurabot_types::models::Participant;
use rand::Rng;
use rand::seq::index;

use crate::{AuraError, Engine};

/// Uniform draw of one participant.
pub fn pick_one<'a, R: Rng>(pool: &'a [Participant], rng: &mut R) -> Option<&'a Participant> {
    if pool.is_empty() {
        return None;
    }
    Some(&pool[rng.random_range(0..pool.len())])
}

/// Uniform draw of two different participants, without replacement.
pub fn pick_two_distinct<'a, R: Rng>(
    pool: &'a [Participant],
    rng: &mut R,
) -> Option<(&'a Participant, &'a Participant)> {
    if pool.len() < 2 {
        return None;
    }
    let picked = index::sample(rng, pool.len(), 2);
    Some((&pool[picked.index(0)], &pool[picked.index(1)]))
}

impl<S: AuraStore> Engine<S> {
    /// One participant of the chat, uniformly.
    pub fn pick_one(&self, chat_id: i64) -> Result<Option<Participant>, AuraError> {
        let pool = self.store.participants(chat_id)?;
        Ok(self.draw(|rng| pick_one(&pool, rng).cloned()))
    }

    /// Two different participants of the chat, uniformly.
    pub fn pick_two_distinct(&self, chat_id: i64) -> Result<Option<(Participant, Participant)>, AuraError> {
        let pool = self.store.participants(chat_id)?;
        Ok(self.draw(|rng| pick_two_distinct(&pool, rng).map(|(a, b)| (a.clone(), b.clone()))))
    }

    /// Draw `count` (1 or 2) participants, or report how many were available.
    pub(crate) fn pick(&self, chat_id: i64, count: usize) -> Result<Vec<Participant>, AuraError> {
        let picked = match count {
            1 => self.pick_one(chat_id)?.map(|p| vec![p]),
            _ => self.pick_two_distinct(chat_id)?.map(|(a, b)| vec![a, b]),
        };
        match picked {
            Some(picked) => Ok(picked),
            None => Err(AuraError::InsufficientParticipants {
                required: count,
                found: self.store.participants(chat_id)?.len(),
            }),
        }
    }
}
