fn main() {
    multiversx_sc_meta_lib::cli_main::<distributed_voting::AbiProvider>();
}
