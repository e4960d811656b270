use rand_chacha::ChaCha8Rng;
use rand_seeder::Seeder;

pub fn new_rng(seed: u32) -> ChaCha8Rng {
    Seeder::from(seed).make_rng()
}
