use mega_chunks::{
    decrypt_download, encrypt_upload, file_meta_mac, plan_chunks, ChunkSchedule, TransferOptions,
};
use mega_crypto::generate_key;

fn make_data(size: usize) -> Vec<u8> {
    // Semi-realistic data: repeating pattern with some entropy
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [1048576, 104857600, 10737418240])]
fn chunk_plan(total: u64) -> usize {
    plan_chunks(divan::black_box(total)).count()
}

#[divan::bench(args = [65536, 1048576, 10485760])]
fn meta_mac(bencher: divan::Bencher, size: usize) {
    let key = generate_key();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| file_meta_mac(&key, [1, 2], divan::black_box(&data), &ChunkSchedule::MEGA));
}

#[divan::bench(args = [65536, 1048576, 10485760])]
fn upload_encrypt(bencher: divan::Bencher, size: usize) {
    let key = generate_key();
    let data = make_data(size);
    let options = TransferOptions::default();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| encrypt_upload(&key, [1, 2], divan::black_box(&data), &options));
}

#[divan::bench(args = [65536, 1048576, 10485760])]
fn download_decrypt(bencher: divan::Bencher, size: usize) {
    let key = generate_key();
    let data = make_data(size);
    let options = TransferOptions::default();
    let upload = encrypt_upload(&key, [1, 2], &data, &options);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            decrypt_download(&upload.node_key, divan::black_box(&upload.ciphertext), &options)
                .unwrap()
        });
}

fn main() {
    divan::main();
}
