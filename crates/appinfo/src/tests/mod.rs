mod helpers;

mod decoder_tests;
