mod writer_tests;
